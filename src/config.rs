/*
 * Copyright 2025 Oxide Computer Company
 */

use crate::variant::ChipVariant;
use core::fmt::{self, Display};
use core::ops::Range;

include!(concat!(env!("OUT_DIR"), "/fifodefs.rs"));

/// Register placement of one bank of FIFOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankMap {
	/// Control word of FIFO 0; the rest follow at 4-byte stride.
	pub ctrl_base: u32,
	/// Working memory of FIFO 0; each FIFO owns `fifo_size` words.
	pub data_base: u32,
	pub fifo_count: u32,
}

impl BankMap {
	pub const fn new(ctrl_base: u32, data_base: u32, fifo_count: u32) -> Self {
		Self {
			ctrl_base,
			data_base,
			fifo_count,
		}
	}

	fn ctrl_range(&self) -> Range<u64> {
		let b = self.ctrl_base as u64;
		b .. b + (self.fifo_count as u64) * 4
	}

	fn data_range(&self, size_bits: u32) -> Range<u64> {
		let b = self.data_base as u64;
		b .. b + ((self.fifo_count as u64) << size_bits) * 4
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
	pub wt: BankMap,
	pub adb: BankMap,
}

impl RegisterMap {
	pub const fn for_chip(chip: ChipVariant) -> Self {
		match (chip) {
			ChipVariant::Au8820 => RegisterMap {
				wt: BankMap::new(0xfa00, 0xe800, 0x20),
				adb: BankMap::new(0xf800, 0xe000, 0x10),
			},
			ChipVariant::Au8830 => RegisterMap {
				wt: BankMap::new(0x17000, 0x10000, 0x40),
				adb: BankMap::new(0x16100, 0x14000, 0x20),
			},
			ChipVariant::Au8810 => RegisterMap {
				wt: BankMap::new(0x17000, 0x10000, 0x20),
				adb: BankMap::new(0x16100, 0x14000, 0x10),
			},
		}
	}

	pub(crate) fn validate(&self, size_bits: u32) -> Result<(), ConfigError> {
		for base in [
			self.wt.ctrl_base,
			self.wt.data_base,
			self.adb.ctrl_base,
			self.adb.data_base,
		] {
			if (base % 4 != 0) {
				return (Err(ConfigError::Misaligned(base)));
			}
		}

		let windows = [
			self.wt.ctrl_range(),
			self.wt.data_range(size_bits),
			self.adb.ctrl_range(),
			self.adb.data_range(size_bits),
		];
		/* every register of every FIFO must have a 32-bit offset */
		for w in &windows {
			if (w.end > 1 << 32) {
				return (Err(ConfigError::OutOfRange(w.start as u32)));
			}
		}
		for (i, a) in windows.iter().enumerate() {
			for b in &windows[i + 1 ..] {
				if (a.start < b.end && b.start < a.end) {
					return (Err(ConfigError::Overlap(
						a.start as u32,
						b.start as u32,
					)));
				}
			}
		}

		Ok(())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
	/// A register base that is not 4-byte aligned.
	Misaligned(u32),
	/// Two register windows, identified by their bases, that intersect.
	Overlap(u32, u32),
	/// A register window, identified by its base, that runs past the end
	/// of the 32-bit register space.
	OutOfRange(u32),
}

impl Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (self) {
			ConfigError::Misaligned(b) => {
				write!(f, "register base {b:#x} is not 4-byte aligned")
			}
			ConfigError::Overlap(a, b) => write!(
				f,
				"register windows at {a:#x} and {b:#x} overlap"
			),
			ConfigError::OutOfRange(b) => write!(
				f,
				"register window at {b:#x} runs past 4 GiB"
			),
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
	pub chip: ChipVariant,
	/// Busy samples tolerated before a control word update proceeds
	/// regardless.
	pub poll_limit: u32,
	/// Enable field value written when a FIFO is armed.
	pub enable_depth: u32,
	/// None selects the chip's usual register map.
	pub map: Option<RegisterMap>,
}

impl Config {
	pub fn chip(mut self, chip: ChipVariant) -> Self {
		self.chip = chip;
		self
	}

	pub fn poll_limit(mut self, limit: u32) -> Self {
		self.poll_limit = limit;
		self
	}

	pub fn enable_depth(mut self, depth: u32) -> Self {
		self.enable_depth = depth;
		self
	}

	pub fn register_map(mut self, map: RegisterMap) -> Self {
		self.map = Some(map);
		self
	}

	pub fn resolved_map(&self) -> RegisterMap {
		self.map.unwrap_or_else(|| RegisterMap::for_chip(self.chip))
	}
}

impl Default for Config {
	fn default() -> Config {
		Config {
			chip: ChipVariant::default(),
			poll_limit: DEFAULT_POLL_LIMIT,
			enable_depth: DEFAULT_ENABLE_DEPTH,
			map: None,
		}
	}
}
