/*
 * Copyright 2025 Oxide Computer Company
 */

use std::io;
use std::sync::{Arc, Mutex};

use vortex_fifo::prelude::*;
use vortex_fifo::regbank::RegisterBank;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

fn logged<F: FnOnce()>(f: F) -> String {
	let cap = Capture::default();
	let w = cap.clone();
	let sub = tracing_subscriber::fmt()
		.with_writer(move || w.clone())
		.with_ansi(false)
		.with_max_level(tracing::Level::ERROR)
		.finish();

	tracing::subscriber::with_default(sub, f);

	let out = cap.0.lock().unwrap().clone();
	String::from_utf8(out).unwrap()
}

#[test]
fn stuck_register_times_out_and_commits_anyway() {
	let v = Vortex::new(
		Config::default().chip(ChipVariant::Au8820).poll_limit(3000),
	)
	.unwrap();
	let f = v.wt(2).unwrap();
	let ctrl = v.ctrl_offset(f);
	let mut b = RegisterBank::new();
	b.hold_bits(ctrl, 0x1, None);

	let out = logged(|| {
		v.set_ctrl(
			&mut b,
			f,
			CtrlRequest {
				ctrl: 1,
				priority: 3,
				empty: 0,
				valid: 1,
				flag: 1,
			},
		)
	});

	assert!(out.contains("ERROR"), "{out}");
	assert!(out.contains("still read-only after 3001 reads"), "{out}");
	assert_eq!(out.lines().count(), 1, "{out}");

	/* 3001 samples and the flush */
	assert_eq!(b.reads_of(ctrl), 3002);
	/* the busy sample had VALID clear, so the FIFO was armed */
	assert_eq!(b.peek(ctrl), 0x0005_101e);
	for slot in 0 .. v.fifo_size() {
		assert_eq!(b.peek(v.data_offset(f, slot)), 0);
	}
}

#[test]
fn stale_busy_sample_is_written_back_when_already_valid() {
	let v = Vortex::new(Config::default()).unwrap();
	let f = v.adb(0).unwrap();
	let ctrl = v.ctrl_offset(f);
	let mut b = RegisterBank::new().with(ctrl, 0x0004_2010);
	b.hold_bits(ctrl, 0x1, None);

	let out = logged(|| {
		v.set_ctrl(
			&mut b,
			f,
			CtrlRequest {
				valid: 1,
				..Default::default()
			},
		)
	});

	assert!(out.contains("still read-only"), "{out}");
	/* the busy samples overflow the access log; rely on the counters */
	assert!(b.truncated());
	assert_eq!(b.writes_to(ctrl), 1);
	assert_eq!(b.peek(ctrl), 0x0004_2011);
	for slot in 0 .. v.fifo_size() {
		assert_eq!(b.writes_to(v.data_offset(f, slot)), 0);
	}
}

#[test]
fn configured_poll_limit_is_honored() {
	let v = Vortex::new(Config::default().poll_limit(9)).unwrap();
	let f = v.wt(0).unwrap();
	let ctrl = v.ctrl_offset(f);
	let mut b = RegisterBank::new();
	b.hold_bits(ctrl, 0x1, None);

	let out = logged(|| {
		v.set_ctrl(&mut b, f, CtrlRequest::default());
	});

	assert!(out.contains("after 10 reads"), "{out}");
	assert_eq!(b.reads_of(ctrl), 11);
}

#[test]
fn prompt_release_logs_nothing() {
	let v = Vortex::new(Config::default().poll_limit(9)).unwrap();
	let f = v.wt(0).unwrap();
	let ctrl = v.ctrl_offset(f);
	let mut b = RegisterBank::new();
	b.hold_bits(ctrl, 0x1, Some(9));

	let out = logged(|| {
		v.set_ctrl(&mut b, f, CtrlRequest::default());
	});

	assert!(out.is_empty(), "{out}");
	assert_eq!(b.reads_of(ctrl), 11);
}
