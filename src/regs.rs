/*
 * Copyright 2025 Oxide Computer Company
 */

/*
 * The register substrate.  Everything in this crate reaches the device
 * through this trait, with byte offsets relative to the start of the
 * device's register window.  Neither operation can fail at this layer; a
 * substrate that can observe bus errors is expected to deal with them
 * itself.
 */
pub trait RegisterSpace {
	fn read32(&mut self, off: u32) -> u32;
	fn write32(&mut self, off: u32, val: u32);
}

#[cfg(feature = "mmio")]
pub use mmio::Mmio;

#[cfg(feature = "mmio")]
mod mmio {
	use super::RegisterSpace;
	use core::ptr;

	/// A mapped register window, accessed with volatile 32-bit loads and
	/// stores.
	pub struct Mmio {
		base: *mut u32,
		len: usize,
	}

	/*
	 * Safety: access is only possible through &mut, and the window is
	 * device memory rather than anything the compiler could cache.
	 */
	unsafe impl Send for Mmio {}

	impl Mmio {
		///
		/// # Safety
		///
		/// `base` must be the 4-byte aligned start of a mapping of at
		/// least `len` bytes of device registers, uncached, that stays
		/// mapped for the lifetime of the returned value and is not
		/// accessed through any other path while it exists.
		///
		pub unsafe fn new(base: *mut u8, len: usize) -> Self {
			Self {
				base: base as *mut u32,
				len,
			}
		}

		pub fn len(&self) -> usize {
			self.len
		}

		pub fn is_empty(&self) -> bool {
			self.len == 0
		}

		fn ptr(&self, off: u32) -> *mut u32 {
			let off = off as usize;
			assert!(
				off % 4 == 0 && off + 4 <= self.len,
				"register offset {off:#x} outside window"
			);
			/*
			 * Safety: in bounds of the mapping per the check above
			 * and the contract of new().
			 */
			unsafe { self.base.add(off / 4) }
		}
	}

	impl RegisterSpace for Mmio {
		fn read32(&mut self, off: u32) -> u32 {
			unsafe { ptr::read_volatile(self.ptr(off)) }
		}

		fn write32(&mut self, off: u32, val: u32) {
			unsafe { ptr::write_volatile(self.ptr(off), val) }
		}
	}

}
