/*
 * Copyright 2025 Oxide Computer Company
 */

use tock_registers::register_bitfields;

/*
 * The fields of a FIFO control word that sit in the same place on every
 * chip.  The enable field, the in-use marker and the extra flag move around
 * between variants and are described by crate::variant::Layout instead.
 */
register_bitfields! {
	u32,
	pub FIFOCTL [
		RDONLY OFFSET(0) NUMBITS(1) [],
		CTRL OFFSET(1) NUMBITS(1) [],
		PRIORITY OFFSET(2) NUMBITS(2) [],
		VALID OFFSET(4) NUMBITS(1) [],
		EMPTY OFFSET(5) NUMBITS(1) []
	]
}
