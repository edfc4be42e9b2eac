// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
		mpsc,
	},
	thread,
	time::Duration,
};

use pyabi_signal::{CondvarSignal, PlatformSignal, Signal, SignalError, platform_signal};
use pyabi_testing::util::wait_for;

fn signals() -> Vec<(&'static str, Arc<dyn Signal>)> {
	vec![
		("platform", Arc::new(PlatformSignal::new().unwrap())),
		("condvar", Arc::new(CondvarSignal::new().unwrap())),
	]
}

#[test]
fn test_wait_is_released_by_post_from_other_thread() {
	for (name, signal) in signals() {
		let released = Arc::new(AtomicBool::new(false));
		let waiter = {
			let signal = signal.clone();
			let released = released.clone();
			thread::spawn(move || {
				signal.wait().unwrap();
				released.store(true, Ordering::SeqCst);
			})
		};

		thread::sleep(Duration::from_millis(10));
		assert!(!released.load(Ordering::SeqCst), "{name}");

		signal.post().unwrap();
		wait_for(|| released.load(Ordering::SeqCst), name);
		waiter.join().unwrap();
	}
}

#[test]
fn test_wait_timeout() {
	for (name, signal) in signals() {
		assert!(!signal.wait_timeout(Duration::from_millis(20)).unwrap(), "{name}");
		signal.post().unwrap();
		assert!(signal.wait_timeout(Duration::from_secs(1)).unwrap(), "{name}");
	}
}

#[test]
fn test_reset_drops_pending_posts() {
	for (name, signal) in signals() {
		for _ in 0..3 {
			signal.post().unwrap();
		}
		signal.reset().unwrap();
		assert!(!signal.try_wait().unwrap(), "{name}");
	}
}

#[test]
fn test_close_releases_blocked_waiters() {
	for (name, signal) in signals() {
		let (sender, receiver) = mpsc::channel();
		let waiters: Vec<_> = (0..2)
			.map(|i| {
				let signal = signal.clone();
				let sender = sender.clone();
				thread::spawn(move || {
					let result = if i == 0 {
						signal.wait()
					} else {
						signal.wait_timeout(Duration::from_secs(30)).map(|_| ())
					};
					let _ = sender.send(result);
				})
			})
			.collect();

		thread::sleep(Duration::from_millis(50));
		signal.close().unwrap();

		for _ in &waiters {
			let result = receiver.recv_timeout(Duration::from_secs(5)).unwrap_or_else(|_| panic!("{name}: waiter still blocked"));
			assert!(matches!(result, Err(SignalError::Closed)), "{name}: {result:?}");
		}
		for waiter in waiters {
			waiter.join().unwrap();
		}

		assert!(matches!(signal.wait(), Err(SignalError::Closed)), "{name}");
		assert!(matches!(signal.post(), Err(SignalError::Closed)), "{name}");
		signal.close().unwrap();
	}
}

#[test]
fn test_platform_signal_handle_is_stable() {
	let signal = platform_signal().unwrap();
	let handle = signal.handle();
	assert!(!handle.is_null());
	signal.post().unwrap();
	assert_eq!(signal.handle(), handle);
	signal.close().unwrap();
}
