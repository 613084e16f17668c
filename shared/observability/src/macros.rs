//! Convenience macros for common logging patterns in MissionHub.

/// Log a call to the robot-control service
#[macro_export]
macro_rules! log_robot_control_call {
    ($operation:expr, $robot_id:expr) => {
        tracing::debug!(target: "robot_control", operation = $operation, robot_id = %$robot_id, "calling robot control");
    };
    ($operation:expr, $robot_id:expr, $duration_ms:expr, $outcome:expr) => {
        tracing::info!(target: "robot_control", operation = $operation, robot_id = %$robot_id, duration_ms = $duration_ms, outcome = $outcome, "robot control call completed");
    };
}

/// Log an admission check
#[macro_export]
macro_rules! log_admission_check {
    ($check:expr, $robot_id:expr, pass) => {
        tracing::debug!(target: "admission", check = $check, robot_id = %$robot_id, result = "pass", "admission check passed");
    };
    ($check:expr, $robot_id:expr, fail, $reason:expr) => {
        tracing::warn!(target: "admission", check = $check, robot_id = %$robot_id, result = "fail", reason = %$reason, "admission check failed");
    };
}

/// Log a retry attempt
#[macro_export]
macro_rules! log_retry {
    ($operation:expr, $attempt:expr, $max_attempts:expr) => {
        tracing::warn!(target: "retry", operation = $operation, attempt = $attempt, max_attempts = $max_attempts, "retrying operation");
    };
    ($operation:expr, $attempt:expr, $max_attempts:expr, $error:expr) => {
        tracing::warn!(target: "retry", operation = $operation, attempt = $attempt, max_attempts = $max_attempts, error = %$error, "retrying after error");
    };
}
