// Copyright 2024 Martin Pool

//! Handle ctrl-c by setting a global atomic, checked between subprocess
//! invocations so that a cancelled run still reports what it finished.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn install_handler() {
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
        .expect("install ctrl-c handler");
}

/// True if the program was interrupted and should wind down.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
