/*
 * Copyright 2025 Oxide Computer Company
 */

use crate::config::{BankMap, Config, ConfigError, RegisterMap};
use crate::regs::RegisterSpace;
use crate::variant::{ChipVariant, Layout};
use core::fmt::{self, Display};
use tock_registers::LocalRegisterCopy;

pub mod regdefs;
use regdefs::FIFOCTL;

pub type CtrlWord = LocalRegisterCopy<u32, FIFOCTL::Register>;

/*
 * Each Vortex has two banks of FIFOs with the same control word format: the
 * wavetable FIFOs and the audio data bus (ADB) FIFOs.  They differ only in
 * where their registers are and how many there are.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FifoBank {
	Wavetable,
	Adb,
}

impl Display for FifoBank {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match (self) {
			FifoBank::Wavetable => "wt",
			FifoBank::Adb => "adb",
		})
	}
}

/// A FIFO known to exist on the device it was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FifoIndex {
	bank: FifoBank,
	idx: u32,
}

impl FifoIndex {
	pub fn bank(&self) -> FifoBank {
		self.bank
	}

	pub fn index(&self) -> u32 {
		self.idx
	}
}

/// Field values for set_ctrl().  Each is masked to the width of its field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CtrlRequest {
	pub ctrl: u32,
	pub priority: u32,
	pub empty: u32,
	pub valid: u32,
	pub flag: u32,
}

/// The control register was still read-only after the poll limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyTimeout {
	pub reads: u32,
	pub last: u32,
}

impl Display for BusyTimeout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"control register still read-only after {} reads \
			 (last {:#010x})",
			self.reads, self.last
		)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	Config(ConfigError),
	FifoRange {
		bank: FifoBank,
		index: u32,
		limit: u32,
	},
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (self) {
			Error::Config(e) => write!(f, "bad configuration: {e}"),
			Error::FifoRange { bank, index, limit } => write!(
				f,
				"{bank} FIFO {index} out of range (device has \
				 {limit})"
			),
		}
	}
}

impl From<ConfigError> for Error {
	fn from(e: ConfigError) -> Self {
		Error::Config(e)
	}
}

/*
 * Per-device context.  Holds nothing that changes after construction, so
 * all operations take &self; the register space is passed in on each call
 * and it is up to the caller not to drive the same FIFO from two places at
 * once.
 */
#[derive(Debug, Clone, Copy)]
pub struct Vortex {
	chip: ChipVariant,
	layout: &'static Layout,
	map: RegisterMap,
	poll_limit: u32,
	enable_depth: u32,
}

impl Vortex {
	pub fn new(cfg: Config) -> Result<Vortex, Error> {
		let layout = cfg.chip.layout();
		let map = cfg.resolved_map();
		map.validate(layout.size_bits)?;

		Ok(Vortex {
			chip: cfg.chip,
			layout,
			map,
			poll_limit: cfg.poll_limit,
			enable_depth: cfg.enable_depth,
		})
	}

	pub fn chip(&self) -> ChipVariant {
		self.chip
	}

	pub fn layout(&self) -> &'static Layout {
		self.layout
	}

	/// Number of working-memory words per FIFO.
	pub fn fifo_size(&self) -> u32 {
		self.layout.fifo_size()
	}

	pub fn fifo_count(&self, bank: FifoBank) -> u32 {
		self.bank_map(bank).fifo_count
	}

	pub fn fifo(&self, bank: FifoBank, idx: u32) -> Result<FifoIndex, Error> {
		let limit = self.fifo_count(bank);
		if (idx >= limit) {
			return (Err(Error::FifoRange {
				bank,
				index: idx,
				limit,
			}));
		}

		Ok(FifoIndex { bank, idx })
	}

	pub fn wt(&self, idx: u32) -> Result<FifoIndex, Error> {
		self.fifo(FifoBank::Wavetable, idx)
	}

	pub fn adb(&self, idx: u32) -> Result<FifoIndex, Error> {
		self.fifo(FifoBank::Adb, idx)
	}

	fn bank_map(&self, bank: FifoBank) -> &BankMap {
		match (bank) {
			FifoBank::Wavetable => &self.map.wt,
			FifoBank::Adb => &self.map.adb,
		}
	}

	pub fn ctrl_offset(&self, fifo: FifoIndex) -> u32 {
		self.bank_map(fifo.bank).ctrl_base.wrapping_add(fifo.idx << 2)
	}

	/*
	 * Slots at or past fifo_size() reach into the next FIFO's memory, as
	 * they do on the hardware.  Offsets wrap at 4 GiB rather than panic.
	 */
	pub fn data_offset(&self, fifo: FifoIndex, slot: u32) -> u32 {
		let base = self.bank_map(fifo.bank).data_base;
		let word = (fifo.idx << self.layout.size_bits).wrapping_add(slot);
		base.wrapping_add(word.wrapping_shl(2))
	}

	/// Samples the control word of `fifo` once.
	pub fn ctrl_word<R: RegisterSpace>(
		&self,
		regs: &mut R,
		fifo: FifoIndex,
	) -> CtrlWord {
		CtrlWord::new(regs.read32(self.ctrl_offset(fifo)))
	}

	/// Zeroes the first `count` working-memory words of `fifo`, highest
	/// slot first.  Does not touch the device at all if `count` < 1.
	pub fn clear_data<R: RegisterSpace>(
		&self,
		regs: &mut R,
		fifo: FifoIndex,
		count: i32,
	) {
		if (count < 1) {
			return;
		}

		tracing::trace!(
			bank = %fifo.bank,
			fifo = fifo.idx,
			count,
			"clearing FIFO data"
		);
		for slot in (0 .. count as u32).rev() {
			regs.write32(self.data_offset(fifo, slot), 0);
		}
	}

	/*
	 * Cold-start reset: the register is assumed writable, so there is no
	 * busy poll here.  The FIFO is left marked in use but not valid.
	 */
	pub fn initialize<R: RegisterSpace>(
		&self,
		regs: &mut R,
		fifo: FifoIndex,
		enable: u32,
	) {
		let l = self.layout;

		self.clear_data(regs, fifo, l.fifo_size() as i32);

		let mut word = CtrlWord::new(0);
		word.write(l.in_use() + l.enable().val(enable));
		regs.write32(self.ctrl_offset(fifo), word.get());
	}

	/*
	 * Callers only do this when they know the register isn't busy, so
	 * RDONLY is not consulted.
	 */
	pub fn set_valid<R: RegisterSpace>(
		&self,
		regs: &mut R,
		fifo: FifoIndex,
		enable: u32,
	) {
		let off = self.ctrl_offset(fifo);
		let mut word = CtrlWord::new(regs.read32(off));

		word.modify(FIFOCTL::VALID.val(enable) + self.layout.in_use());
		regs.write32(off, word.get());
	}

	/*
	 * Sample the control word until the hardware drops RDONLY.  Gives up
	 * once more than poll_limit samples have come back busy, handing back
	 * the last one.
	 */
	fn poll_writable<R: RegisterSpace>(
		&self,
		regs: &mut R,
		off: u32,
	) -> Result<CtrlWord, BusyTimeout> {
		let mut reads: u32 = 0;

		loop {
			let word = CtrlWord::new(regs.read32(off));
			reads = reads.saturating_add(1);

			if (!word.is_set(FIFOCTL::RDONLY)) {
				return (Ok(word));
			}
			if (reads > self.poll_limit || reads == u32::MAX) {
				return (Err(BusyTimeout {
					reads,
					last: word.get(),
				}));
			}
		}
	}

	/// Arms or disarms `fifo`, waiting (within reason) for the hardware
	/// to release its control register first.
	///
	/// Arming a FIFO that is not yet valid clears its working memory and
	/// rebuilds the control word from `req`; arming one that is already
	/// valid rewrites the word as found.  Disarming a valid FIFO clears
	/// VALID and sets the chip's disarmed flag pattern; disarming one that
	/// is not valid only clears its working memory.
	///
	/// This never fails.  If the register stays read-only the timeout is
	/// logged and the update goes ahead on the stale sample.
	pub fn set_ctrl<R: RegisterSpace>(
		&self,
		regs: &mut R,
		fifo: FifoIndex,
		req: CtrlRequest,
	) {
		let l = self.layout;
		let off = self.ctrl_offset(fifo);

		let mut word = self.poll_writable(regs, off).unwrap_or_else(|e| {
			tracing::error!(
				bank = %fifo.bank,
				fifo = fifo.idx,
				reads = e.reads,
				word = e.last,
				"set_ctrl: {}",
				e
			);
			CtrlWord::new(e.last)
		});
		let valid = word.is_set(FIFOCTL::VALID);

		match (req.valid != 0, valid) {
			(true, false) => {
				self.clear_data(regs, fifo, l.fifo_size() as i32);
				word.write(
					l.enable().val(self.enable_depth) +
						FIFOCTL::CTRL.val(req.ctrl) +
						FIFOCTL::PRIORITY
							.val(req.priority) +
						FIFOCTL::VALID.val(req.valid) +
						l.in_use() +
						FIFOCTL::EMPTY.val(req.empty) +
						l.flag_armed(req.flag),
				);
			}
			(true, true) => {}
			(false, true) => {
				word.modify(
					FIFOCTL::VALID::CLEAR +
						l.flag_disarmed(req.flag),
				);
				word.set(word.get() | l.fifo_bits);
			}
			(false, false) => {
				self.clear_data(regs, fifo, l.fifo_size() as i32);
			}
		}

		tracing::trace!(
			bank = %fifo.bank,
			fifo = fifo.idx,
			word = word.get(),
			"commit FIFO control"
		);
		regs.write32(off, word.get());
		/* flush the posted write */
		let _ = regs.read32(off);
	}
}
