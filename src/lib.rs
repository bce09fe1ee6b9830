/*
 * Copyright 2025 Oxide Computer Company
 */

/*
 * FIFO control for the Aureal Vortex family of PCI audio accelerators
 * (AU8820, AU8830, AU8810).  This covers only the FIFO control words and
 * their working memory; everything else about driving the chip belongs to
 * the caller, which supplies register access through regs::RegisterSpace.
 */

#![cfg_attr(not(test), no_std)]
#![allow(unused_parens)]

pub mod config;
pub mod fifo;
#[cfg(any(test, feature = "regbank"))]
pub mod regbank;
pub mod regs;
pub mod variant;

pub use config::{BankMap, Config, ConfigError, RegisterMap};
pub use fifo::{
	BusyTimeout, CtrlRequest, CtrlWord, Error, FifoBank, FifoIndex, Vortex,
};
pub use regs::RegisterSpace;
pub use variant::ChipVariant;

pub mod prelude {
	pub use crate::fifo::regdefs::FIFOCTL;
	pub use crate::{ChipVariant, Config, CtrlRequest, RegisterSpace, Vortex};
}
