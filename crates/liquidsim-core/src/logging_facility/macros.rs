//! Canonical logging macros
//!
//! Every macro stamps `component` and `op`; extra `key = value` fields may
//! follow, in the usual `tracing` syntax.

/// Log the start of an operation
///
/// ```
/// # use liquidsim_core::log_op_start;
/// log_op_start!("build_timeline");
/// log_op_start!("build_timeline", run_id = "r-1", step_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = liquidsim_core_types::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use liquidsim_core::log_op_end;
/// log_op_end!("build_timeline", duration_ms = 42, command_count = 12);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = liquidsim_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log a step that failed, keyed by step id
///
/// `$errors` is the failure's error list; the first error supplies
/// `err.kind` and `err.code`. An empty list logs nothing.
///
/// ```
/// # use liquidsim_core::log_op_error;
/// # use liquidsim_core::errors::CommandCreatorError;
/// let errors = vec![CommandCreatorError::pipette_does_not_exist("aspirate", "p9")];
/// log_op_error!("build_timeline", "s1", errors, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $step_id:expr, $errors:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let errors: &[$crate::errors::CommandCreatorError] = ::std::convert::AsRef::as_ref(&$errors);
        if let Some(first) = errors.first() {
            tracing::warn!(
                component = module_path!(),
                op = $op,
                event = liquidsim_core_types::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                step_id = $step_id,
                err.kind = ?first.kind(),
                err.code = first.code(),
                error_count = errors.len(),
                $($($field)*)?
            );
        }
    }};
}
