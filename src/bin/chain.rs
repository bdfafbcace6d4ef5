//! Runs a fixed chain and a fixed fan-in and prints what happens.
//!
//! Set `RUST_LOG=trace` to watch the promises settle.
use promise_chain::{double_then, parallel, spawn};
use std::{thread, time::Duration};

fn main() {
    env_logger::init();

    let source = spawn(|| {
        thread::sleep(Duration::from_millis(100));
        Ok::<i32, String>(10)
    });

    let doubled = double_then(&source, |v: i32| {
        println!("double: {}", v);
        Ok(v * 2)
    });

    let result = doubled
        .then(|v| {
            println!("step1: {}", v);
            Ok(v * 2)
        })
        .then(|v| {
            println!("step2: {}", v);
            Err("something went wrong".to_string())
        })
        .then(|v| {
            println!("step3: {}", v);
            Ok(v + 100)
        })
        .catch(|err| {
            println!("caught error: {}", err);
            Err(err)
        })
        .finally(|| println!("finally called!"))
        .wait();
    println!("final result: {:?}", result);

    let p1 = spawn(|| {
        thread::sleep(Duration::from_millis(200));
        println!("p1 done");
        Ok::<i32, String>(100)
    });
    let p2 = spawn(|| {
        thread::sleep(Duration::from_millis(100));
        println!("p2 done");
        Ok(200)
    });
    let p3 = spawn(|| {
        thread::sleep(Duration::from_millis(150));
        println!("p3 done");
        Ok(300)
    });
    println!("parallel results: {:?}", parallel([p1, p2, p3]).wait());
}
