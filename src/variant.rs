/*
 * Copyright 2025 Oxide Computer Company
 */

use crate::fifo::regdefs::FIFOCTL;
use core::convert::TryFrom;
use core::fmt::{self, Display};
use static_assertions::*;
use tock_registers::fields::{Field, FieldValue};

/*
 * The three members of the Vortex family.  They share a control word
 * format for their FIFOs except for where the enable field, the in-use
 * marker, and the extra flag live, and for the constant pattern the later
 * parts want ORed in when a FIFO is disarmed.
 */
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipVariant {
	/// Vortex 1
	Au8820,
	/// Vortex 2
	#[default]
	Au8830,
	/// Vortex Advantage
	Au8810,
}

impl TryFrom<u16> for ChipVariant {
	type Error = ();

	/// Maps an Aureal PCI device ID to the chip it identifies.
	fn try_from(dev: u16) -> Result<Self, Self::Error> {
		match (dev) {
			0x0001 => Ok(ChipVariant::Au8820),
			0x0002 => Ok(ChipVariant::Au8830),
			0x0003 => Ok(ChipVariant::Au8810),
			_ => Err(()),
		}
	}
}

impl Display for ChipVariant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match (self) {
			ChipVariant::Au8820 => "au8820",
			ChipVariant::Au8830 => "au8830",
			ChipVariant::Au8810 => "au8810",
		})
	}
}

impl ChipVariant {
	pub const fn layout(self) -> &'static Layout {
		match (self) {
			ChipVariant::Au8820 => &AU8820,
			ChipVariant::Au8830 => &AU8830,
			ChipVariant::Au8810 => &AU8810,
		}
	}
}

/// Where the variant-specific pieces of a FIFO control word live.
#[derive(Debug)]
pub struct Layout {
	pub enable_shift: usize,
	pub enable_mask: u32,
	/// Bit position of the in-use marker (FIFO_U1 in Aureal's headers).
	pub in_use_bit: usize,
	pub flag_shift: usize,
	/// 1, or 2 on parts that mirror the extra flag into a second bit.
	pub flag_width: usize,
	/// ORed into the word when a FIFO is disarmed.
	pub fifo_bits: u32,
	/// log2 of the number of working-memory words per FIFO.
	pub size_bits: u32,
}

pub const AU8820: Layout = Layout {
	enable_shift: 11,
	enable_mask: 0x1f,
	in_use_bit: 16,
	flag_shift: 18,
	flag_width: 1,
	fifo_bits: 0,
	size_bits: 5,
};

pub const AU8830: Layout = Layout {
	enable_shift: 12,
	enable_mask: 0x3f,
	in_use_bit: 18,
	flag_shift: 27,
	flag_width: 2,
	fifo_bits: 0x1c40_0000,
	size_bits: 6,
};

pub const AU8810: Layout = Layout {
	enable_shift: 12,
	enable_mask: 0x3f,
	in_use_bit: 18,
	flag_shift: 24,
	flag_width: 2,
	fifo_bits: 0x0380_0000,
	size_bits: 6,
};

const COMMON_BITS: u32 = 0x3f;

impl Layout {
	pub const fn enable_bits(&self) -> u32 {
		self.enable_mask << self.enable_shift
	}

	pub const fn in_use_bits(&self) -> u32 {
		1 << self.in_use_bit
	}

	pub const fn flag_mask(&self) -> u32 {
		(1 << self.flag_width) - 1
	}

	pub const fn flag_bits(&self) -> u32 {
		self.flag_mask() << self.flag_shift
	}

	/// Number of working-memory words backing one FIFO.
	pub const fn fifo_size(&self) -> u32 {
		1 << self.size_bits
	}

	pub fn enable(&self) -> Field<u32, FIFOCTL::Register> {
		Field::new(self.enable_mask, self.enable_shift)
	}

	pub fn in_use(&self) -> FieldValue<u32, FIFOCTL::Register> {
		Field::<u32, FIFOCTL::Register>::new(1, self.in_use_bit).val(1)
	}

	pub fn flag(&self) -> Field<u32, FIFOCTL::Register> {
		Field::new(self.flag_mask(), self.flag_shift)
	}

	/// The extra flag as written when a FIFO is armed: bit 0 of `f` copied
	/// into every flag bit.
	pub fn flag_armed(&self, f: u32) -> FieldValue<u32, FIFOCTL::Register> {
		self.flag().val(if (f & 1 != 0) { self.flag_mask() } else { 0 })
	}

	/// The extra flag as written when a FIFO is disarmed: bit 0 of `f` in
	/// the lowest flag bit, any mirror cleared.
	pub fn flag_disarmed(&self, f: u32) -> FieldValue<u32, FIFOCTL::Register> {
		self.flag().val(f & 1)
	}
}

macro_rules! assert_layout {
	($l:ident) => {
		const_assert_eq!($l.enable_bits() & COMMON_BITS, 0);
		const_assert_eq!($l.enable_bits() & $l.in_use_bits(), 0);
		const_assert_eq!($l.enable_bits() & $l.flag_bits(), 0);
		const_assert_eq!($l.in_use_bits() & $l.flag_bits(), 0);
		const_assert_eq!($l.fifo_bits & (COMMON_BITS | $l.enable_bits()), 0);
		const_assert!($l.flag_width == 1 || $l.flag_width == 2);
		const_assert!($l.size_bits <= 8);
	};
}

assert_layout!(AU8820);
assert_layout!(AU8830);
assert_layout!(AU8810);

#[cfg(test)]
mod tests {
	use super::*;
	use tock_registers::LocalRegisterCopy;

	#[test]
	fn pci_device_ids() {
		assert_eq!(ChipVariant::try_from(0x0001u16), Ok(ChipVariant::Au8820));
		assert_eq!(ChipVariant::try_from(0x0002u16), Ok(ChipVariant::Au8830));
		assert_eq!(ChipVariant::try_from(0x0003u16), Ok(ChipVariant::Au8810));
		assert_eq!(ChipVariant::try_from(0x0004u16), Err(()));
	}

	#[test]
	fn field_positions() {
		assert_eq!(AU8820.enable_bits(), 0x0000_f800);
		assert_eq!(AU8830.enable_bits(), 0x0003_f000);
		assert_eq!(AU8820.in_use_bits(), 0x0001_0000);
		assert_eq!(AU8830.in_use_bits(), 0x0004_0000);
		assert_eq!(AU8820.flag_bits(), 0x0004_0000);
		assert_eq!(AU8830.flag_bits(), 0x1800_0000);
		assert_eq!(AU8810.flag_bits(), 0x0300_0000);
		assert_eq!(AU8820.fifo_size(), 32);
		assert_eq!(AU8810.fifo_size(), 64);
	}

	#[test]
	fn armed_flag_is_mirrored() {
		let mut w = LocalRegisterCopy::<u32, FIFOCTL::Register>::new(0);
		w.modify(AU8830.flag_armed(1));
		assert_eq!(w.get(), (1 << 27) | (1 << 28));

		w.modify(AU8830.flag_armed(2));
		assert_eq!(w.get(), 0);

		w.modify(AU8820.flag_armed(1));
		assert_eq!(w.get(), 1 << 18);
	}

	#[test]
	fn disarmed_flag_sets_only_the_low_bit() {
		let mut w = LocalRegisterCopy::<u32, FIFOCTL::Register>::new(
			0x0300_0000,
		);
		w.modify(AU8810.flag_disarmed(1));
		assert_eq!(w.get(), 1 << 24);

		w.modify(AU8810.flag_disarmed(0));
		assert_eq!(w.get(), 0);
	}

	#[test]
	fn enable_value_is_masked_to_the_field() {
		let mut w = LocalRegisterCopy::<u32, FIFOCTL::Register>::new(0);
		w.modify(AU8820.enable().val(0x22));
		assert_eq!(w.get(), 0x2 << 11);

		w.modify(AU8830.enable().val(0x7f));
		assert_eq!(w.get() & AU8830.enable_bits(), 0x3f << 12);
	}
}
