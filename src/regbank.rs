/*
 * Copyright 2025 Oxide Computer Company
 */

/*
 * An in-memory register substrate.  It remembers every value written, keeps
 * an ordered log of accesses, and can be told to hold arbitrary bits high
 * on reads of a particular register, which is how a hardware-owned busy bit
 * is simulated.  Unwritten registers read as zero.
 */

use crate::regs::RegisterSpace;
use heapless::{FnvIndexMap, Vec};

pub const BANK_REGS: usize = 512;
pub const LOG_LEN: usize = 1024;
const HOLDS: usize = 8;
const COUNTED: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
	Read(u32, u32),
	Write(u32, u32),
}

impl Access {
	pub fn offset(&self) -> u32 {
		match (self) {
			Access::Read(off, _) | Access::Write(off, _) => *off,
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct Hold {
	mask: u32,
	/* None: for every read from now on */
	reads: Option<u32>,
}

#[derive(Debug, Default)]
pub struct RegisterBank {
	regs: FnvIndexMap<u32, u32, BANK_REGS>,
	holds: FnvIndexMap<u32, Hold, HOLDS>,
	reads: FnvIndexMap<u32, u32, COUNTED>,
	writes: FnvIndexMap<u32, u32, BANK_REGS>,
	log: Vec<Access, LOG_LEN>,
	truncated: bool,
}

impl RegisterBank {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a register without logging it.
	pub fn poke(&mut self, off: u32, val: u32) {
		if (self.regs.insert(off, val).is_err()) {
			self.truncated = true;
		}
	}

	pub fn with(mut self, off: u32, val: u32) -> Self {
		self.poke(off, val);
		self
	}

	/// Returns the stored value of a register, ignoring any held bits,
	/// without logging the access.
	pub fn peek(&self, off: u32) -> u32 {
		self.regs.get(&off).copied().unwrap_or(0)
	}

	/// Forces `mask` set in the value returned by the next `reads` reads of
	/// `off`, or by every read if `reads` is None.  The stored value is not
	/// affected.
	pub fn hold_bits(&mut self, off: u32, mask: u32, reads: Option<u32>) {
		if (self.holds.insert(off, Hold { mask, reads }).is_err()) {
			self.truncated = true;
		}
	}

	pub fn release(&mut self, off: u32) {
		self.holds.remove(&off);
	}

	pub fn log(&self) -> &[Access] {
		&self.log
	}

	pub fn clear_log(&mut self) {
		self.log.clear();
		self.reads.clear();
		self.writes.clear();
		self.truncated = false;
	}

	/// True if some access could not be recorded because one of the
	/// fixed-size tables filled up.
	pub fn truncated(&self) -> bool {
		self.truncated
	}

	pub fn writes(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
		self.log.iter().filter_map(|a| match (a) {
			Access::Write(off, val) => Some((*off, *val)),
			Access::Read(..) => None,
		})
	}

	/// Number of writes to `off` since creation or the last clear_log().
	/// Unlike the log, this keeps counting after the log fills.
	pub fn writes_to(&self, off: u32) -> u32 {
		self.writes.get(&off).copied().unwrap_or(0)
	}

	/// Read counterpart of writes_to().
	pub fn reads_of(&self, off: u32) -> u32 {
		self.reads.get(&off).copied().unwrap_or(0)
	}

	fn count<const N: usize>(
		counts: &mut FnvIndexMap<u32, u32, N>,
		off: u32,
	) -> bool {
		match (counts.get_mut(&off)) {
			Some(n) => {
				*n = n.saturating_add(1);
				true
			}
			None => counts.insert(off, 1).is_ok(),
		}
	}

	fn record(&mut self, a: Access) {
		if (self.log.push(a).is_err()) {
			self.truncated = true;
		}
	}

	fn held(&mut self, off: u32) -> u32 {
		let Some(h) = self.holds.get_mut(&off) else {
			return (0);
		};

		let mask = h.mask;
		let reads = h.reads;
		match (reads) {
			None => mask,
			Some(0) => {
				self.holds.remove(&off);
				0
			}
			Some(n) => {
				h.reads = Some(n - 1);
				mask
			}
		}
	}
}

impl RegisterSpace for RegisterBank {
	fn read32(&mut self, off: u32) -> u32 {
		let val = self.peek(off) | self.held(off);

		if (!Self::count(&mut self.reads, off)) {
			self.truncated = true;
		}
		self.record(Access::Read(off, val));
		val
	}

	fn write32(&mut self, off: u32, val: u32) {
		self.poke(off, val);
		if (!Self::count(&mut self.writes, off)) {
			self.truncated = true;
		}
		self.record(Access::Write(off, val));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unwritten_registers_read_zero() {
		let mut b = RegisterBank::new();
		assert_eq!(b.read32(0x40), 0);
		assert_eq!(b.reads_of(0x40), 1);
		assert_eq!(b.log(), &[Access::Read(0x40, 0)]);
	}

	#[test]
	fn held_bits_expire_after_the_requested_reads() {
		let mut b = RegisterBank::new().with(0x10, 0x20);
		b.hold_bits(0x10, 0x1, Some(2));

		assert_eq!(b.read32(0x10), 0x21);
		assert_eq!(b.read32(0x10), 0x21);
		assert_eq!(b.read32(0x10), 0x20);
		assert_eq!(b.read32(0x10), 0x20);
		assert_eq!(b.peek(0x10), 0x20);
	}

	#[test]
	fn held_bits_without_a_count_never_expire() {
		let mut b = RegisterBank::new();
		b.hold_bits(0x8, 0x1, None);

		for _ in 0 .. 5000 {
			assert_eq!(b.read32(0x8) & 0x1, 0x1);
		}
		assert_eq!(b.reads_of(0x8), 5000);
		assert!(b.truncated());

		b.release(0x8);
		assert_eq!(b.read32(0x8), 0);
	}

	#[test]
	fn writes_are_stored_and_logged_in_order() {
		let mut b = RegisterBank::new();
		b.write32(0x4, 7);
		b.write32(0x0, 9);
		b.write32(0x4, 8);

		assert_eq!(b.peek(0x4), 8);
		assert_eq!(b.writes_to(0x4), 2);
		let w: heapless::Vec<(u32, u32), 4> = b.writes().collect();
		assert_eq!(&w[..], &[(0x4, 7), (0x0, 9), (0x4, 8)]);

		b.clear_log();
		assert!(b.log().is_empty());
		assert_eq!(b.peek(0x0), 9);
	}

	#[test]
	fn write_counts_survive_a_full_log() {
		let mut b = RegisterBank::new();
		for _ in 0 .. LOG_LEN {
			b.read32(0x20);
		}
		assert!(!b.truncated());

		b.write32(0x20, 5);
		assert!(b.truncated());
		assert_eq!(b.writes().count(), 0);
		assert_eq!(b.writes_to(0x20), 1);
		assert_eq!(b.peek(0x20), 5);
	}
}
