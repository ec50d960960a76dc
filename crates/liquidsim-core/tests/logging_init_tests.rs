//! Global subscriber initialization runs in its own test binary so it never
//! competes with the capture layer used elsewhere.

use liquidsim_core::log_op_start;
use liquidsim_core::logging_facility::{init, Profile};

#[test]
fn test_init_is_idempotent() {
    init(Profile::Test);
    // Later calls are ignored, whatever the profile
    init(Profile::Production);
    init(Profile::Development);

    log_op_start!("logging_init_smoke");
}
