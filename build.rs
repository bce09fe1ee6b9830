/*
 * XXX Work around cargo#4423 host/target flags gap
 */
#![allow(unused_parens)]

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

struct Defs {
	poll_limit: u32,
	enable_depth: u32,
}

/*
 * poll_limit: busy samples tolerated before a control register update
 * proceeds anyway.  enable_depth: enable field value written when a FIFO
 * is armed.
 */
static DEFS: Defs = Defs {
	poll_limit: 3000,
	enable_depth: 2,
};

fn env_u32(name: &str, def: u32) -> u32 {
	env::var(name)
		.unwrap_or_else(|_| def.to_string())
		.parse::<u32>()
		.unwrap_or(def)
}

fn main() {
	let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
	let mut defs_file = File::create(out.join("fifodefs.rs")).unwrap();

	writeln!(
		defs_file,
		"const DEFAULT_POLL_LIMIT: u32 = {};",
		env_u32("VORTEX_FIFO_POLL_LIMIT", DEFS.poll_limit)
	)
	.unwrap();
	writeln!(
		defs_file,
		"const DEFAULT_ENABLE_DEPTH: u32 = {};",
		env_u32("VORTEX_FIFO_ENABLE_DEPTH", DEFS.enable_depth)
	)
	.unwrap();

	println!("cargo:rerun-if-env-changed=VORTEX_FIFO_POLL_LIMIT");
	println!("cargo:rerun-if-env-changed=VORTEX_FIFO_ENABLE_DEPTH");
}
