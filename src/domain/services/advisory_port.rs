//! Advisory Port Allocator
//!
//! Picks the port number echoed to the operator for their reverse-forward
//! command. The broker never binds or tracks it, so no uniqueness is
//! enforced across calls. The thread RNG is seeded once from the OS, never
//! reseeded per call.

use rand::Rng;

const PORT_MIN: u16 = 50000;
const PORT_MAX: u16 = 65535;

/// Pick a random advisory port in [50000, 65535].
pub fn advisory_port() -> u16 {
    rand::thread_rng().gen_range(PORT_MIN..=PORT_MAX)
}
