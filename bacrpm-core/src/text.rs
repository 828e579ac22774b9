//! Human-readable labels for protocol enumerations
//!
//! Labels follow the hyphenated lower-case spelling used by the standard's
//! ASN.1 productions. Lookups return `None` for values without a label so
//! callers choose their own fallback.

/// Object type label
pub fn object_type_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 => "analog-input",
        1 => "analog-output",
        2 => "analog-value",
        3 => "binary-input",
        4 => "binary-output",
        5 => "binary-value",
        6 => "calendar",
        7 => "command",
        8 => "device",
        9 => "event-enrollment",
        10 => "file",
        11 => "group",
        12 => "loop",
        13 => "multi-state-input",
        14 => "multi-state-output",
        15 => "notification-class",
        16 => "program",
        17 => "schedule",
        18 => "averaging",
        19 => "multi-state-value",
        20 => "trend-log",
        21 => "life-safety-point",
        22 => "life-safety-zone",
        23 => "accumulator",
        24 => "pulse-converter",
        25 => "event-log",
        26 => "global-group",
        27 => "trend-log-multiple",
        28 => "load-control",
        29 => "structured-view",
        30 => "access-door",
        31 => "timer",
        32 => "access-credential",
        33 => "access-point",
        34 => "access-rights",
        35 => "access-user",
        36 => "access-zone",
        37 => "credential-data-input",
        38 => "network-security",
        39 => "bitstring-value",
        40 => "characterstring-value",
        41 => "date-pattern-value",
        42 => "date-value",
        43 => "datetime-pattern-value",
        44 => "datetime-value",
        45 => "integer-value",
        46 => "large-analog-value",
        47 => "octetstring-value",
        48 => "positive-integer-value",
        49 => "time-pattern-value",
        50 => "time-value",
        51 => "notification-forwarder",
        52 => "alert-enrollment",
        53 => "channel",
        54 => "lighting-output",
        55 => "binary-lighting-output",
        56 => "network-port",
        57 => "elevator-group",
        58 => "escalator",
        59 => "lift",
        _ => return None,
    })
}

/// Property identifier label
pub fn property_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 => "acked-transitions",
        1 => "ack-required",
        2 => "action",
        3 => "action-text",
        4 => "active-text",
        5 => "active-vt-sessions",
        6 => "alarm-value",
        7 => "alarm-values",
        8 => "all",
        9 => "all-writes-successful",
        10 => "apdu-segment-timeout",
        11 => "apdu-timeout",
        12 => "application-software-version",
        13 => "archive",
        14 => "bias",
        15 => "change-of-state-count",
        16 => "change-of-state-time",
        17 => "notification-class",
        19 => "controlled-variable-reference",
        20 => "controlled-variable-units",
        21 => "controlled-variable-value",
        22 => "cov-increment",
        23 => "date-list",
        24 => "daylight-savings-status",
        25 => "deadband",
        26 => "derivative-constant",
        27 => "derivative-constant-units",
        28 => "description",
        29 => "description-of-halt",
        30 => "device-address-binding",
        31 => "device-type",
        32 => "effective-period",
        33 => "elapsed-active-time",
        34 => "error-limit",
        35 => "event-enable",
        36 => "event-state",
        37 => "event-type",
        38 => "exception-schedule",
        39 => "fault-values",
        40 => "feedback-value",
        41 => "file-access-method",
        42 => "file-size",
        43 => "file-type",
        44 => "firmware-revision",
        45 => "high-limit",
        46 => "inactive-text",
        47 => "in-process",
        48 => "instance-of",
        49 => "integral-constant",
        50 => "integral-constant-units",
        52 => "limit-enable",
        53 => "list-of-group-members",
        54 => "list-of-object-property-references",
        56 => "local-date",
        57 => "local-time",
        58 => "location",
        59 => "low-limit",
        60 => "manipulated-variable-reference",
        61 => "maximum-output",
        62 => "max-apdu-length-accepted",
        63 => "max-info-frames",
        64 => "max-master",
        65 => "max-pres-value",
        66 => "minimum-off-time",
        67 => "minimum-on-time",
        68 => "minimum-output",
        69 => "min-pres-value",
        70 => "model-name",
        71 => "modification-date",
        72 => "notify-type",
        73 => "number-of-apdu-retries",
        74 => "number-of-states",
        75 => "object-identifier",
        76 => "object-list",
        77 => "object-name",
        78 => "object-property-reference",
        79 => "object-type",
        80 => "optional",
        81 => "out-of-service",
        82 => "output-units",
        83 => "event-parameters",
        84 => "polarity",
        85 => "present-value",
        86 => "priority",
        87 => "priority-array",
        88 => "priority-for-writing",
        89 => "process-identifier",
        90 => "program-change",
        91 => "program-location",
        92 => "program-state",
        93 => "proportional-constant",
        94 => "proportional-constant-units",
        96 => "protocol-object-types-supported",
        97 => "protocol-services-supported",
        98 => "protocol-version",
        99 => "read-only",
        100 => "reason-for-halt",
        102 => "recipient-list",
        103 => "reliability",
        104 => "relinquish-default",
        105 => "required",
        106 => "resolution",
        107 => "segmentation-supported",
        108 => "setpoint",
        109 => "setpoint-reference",
        110 => "state-text",
        111 => "status-flags",
        112 => "system-status",
        113 => "time-delay",
        114 => "time-of-active-time-reset",
        115 => "time-of-state-count-reset",
        116 => "time-synchronization-recipients",
        117 => "units",
        118 => "update-interval",
        119 => "utc-offset",
        120 => "vendor-identifier",
        121 => "vendor-name",
        122 => "vt-classes-supported",
        123 => "weekly-schedule",
        124 => "attempted-samples",
        125 => "average-value",
        126 => "buffer-size",
        127 => "client-cov-increment",
        128 => "cov-resubscription-interval",
        130 => "event-time-stamps",
        131 => "log-buffer",
        132 => "log-device-object-property",
        133 => "enable",
        134 => "log-interval",
        135 => "maximum-value",
        136 => "minimum-value",
        137 => "notification-threshold",
        139 => "protocol-revision",
        140 => "records-since-notification",
        141 => "record-count",
        142 => "start-time",
        143 => "stop-time",
        144 => "stop-when-full",
        145 => "total-record-count",
        146 => "valid-samples",
        147 => "window-interval",
        148 => "window-samples",
        149 => "maximum-value-timestamp",
        150 => "minimum-value-timestamp",
        151 => "variance-value",
        152 => "active-cov-subscriptions",
        153 => "backup-failure-timeout",
        154 => "configuration-files",
        155 => "database-revision",
        156 => "direct-reading",
        157 => "last-restore-time",
        158 => "maintenance-required",
        159 => "member-of",
        160 => "mode",
        161 => "operation-expected",
        162 => "setting",
        163 => "silenced",
        164 => "tracking-value",
        165 => "zone-members",
        166 => "life-safety-alarm-values",
        167 => "max-segments-accepted",
        168 => "profile-name",
        169 => "auto-slave-discovery",
        170 => "manual-slave-address-binding",
        171 => "slave-address-binding",
        172 => "slave-proxy-enable",
        173 => "last-notify-record",
        174 => "schedule-default",
        175 => "accepted-modes",
        176 => "adjust-value",
        177 => "count",
        178 => "count-before-change",
        179 => "count-change-time",
        180 => "cov-period",
        181 => "input-reference",
        182 => "limit-monitoring-interval",
        183 => "logging-object",
        184 => "logging-record",
        185 => "prescale",
        186 => "pulse-rate",
        187 => "scale",
        188 => "scale-factor",
        189 => "update-time",
        190 => "value-before-change",
        191 => "value-set",
        192 => "value-change-time",
        193 => "align-intervals",
        195 => "interval-offset",
        196 => "last-restart-reason",
        197 => "logging-type",
        202 => "restart-notification-recipients",
        203 => "time-of-device-restart",
        204 => "time-synchronization-interval",
        205 => "trigger",
        206 => "utc-time-synchronization-recipients",
        207 => "node-subtype",
        208 => "node-type",
        209 => "structured-object-list",
        210 => "subordinate-annotations",
        211 => "subordinate-list",
        212 => "actual-shed-level",
        213 => "duty-window",
        214 => "expected-shed-level",
        215 => "full-duty-baseline",
        218 => "requested-shed-level",
        219 => "shed-duration",
        220 => "shed-level-descriptions",
        221 => "shed-levels",
        222 => "state-description",
        _ => return None,
    })
}

/// Error class label
pub fn error_class_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 => "device",
        1 => "object",
        2 => "property",
        3 => "resources",
        4 => "security",
        5 => "services",
        6 => "vt",
        7 => "communication",
        _ => return None,
    })
}

/// Error code label
pub fn error_code_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 => "other",
        2 => "configuration-in-progress",
        3 => "device-busy",
        4 => "dynamic-creation-not-supported",
        5 => "file-access-denied",
        7 => "inconsistent-parameters",
        8 => "inconsistent-selection-criterion",
        9 => "invalid-data-type",
        10 => "invalid-file-access-method",
        11 => "invalid-file-start-position",
        13 => "invalid-parameter-data-type",
        14 => "invalid-time-stamp",
        16 => "missing-required-parameter",
        17 => "no-objects-of-specified-type",
        18 => "no-space-for-object",
        19 => "no-space-to-add-list-element",
        20 => "no-space-to-write-property",
        21 => "no-vt-sessions-available",
        22 => "property-is-not-a-list",
        23 => "object-deletion-not-permitted",
        24 => "object-identifier-already-exists",
        25 => "operational-problem",
        26 => "password-failure",
        27 => "read-access-denied",
        29 => "service-request-denied",
        30 => "timeout",
        31 => "unknown-object",
        32 => "unknown-property",
        34 => "unknown-vt-class",
        35 => "unknown-vt-session",
        36 => "unsupported-object-type",
        37 => "value-out-of-range",
        38 => "vt-session-already-closed",
        39 => "vt-session-termination-failure",
        40 => "write-access-denied",
        41 => "character-set-not-supported",
        42 => "invalid-array-index",
        43 => "cov-subscription-failed",
        44 => "not-cov-property",
        45 => "optional-functionality-not-supported",
        46 => "invalid-configuration-data",
        47 => "datatype-not-supported",
        48 => "duplicate-name",
        49 => "duplicate-object-id",
        50 => "property-is-not-an-array",
        _ => return None,
    })
}

/// Abort reason label
pub fn abort_reason_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 => "other",
        1 => "buffer-overflow",
        2 => "invalid-apdu-in-this-state",
        3 => "preempted-by-higher-priority-task",
        4 => "segmentation-not-supported",
        5 => "security-error",
        6 => "insufficient-security",
        7 => "window-size-out-of-range",
        8 => "application-exceeded-reply-time",
        9 => "out-of-resources",
        10 => "tsm-timeout",
        11 => "apdu-too-long",
        _ => return None,
    })
}

/// Reject reason label
pub fn reject_reason_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 => "other",
        1 => "buffer-overflow",
        2 => "inconsistent-parameters",
        3 => "invalid-parameter-data-type",
        4 => "invalid-tag",
        5 => "missing-required-parameter",
        6 => "parameter-out-of-range",
        7 => "too-many-arguments",
        8 => "undefined-enumeration",
        9 => "unrecognized-service",
        _ => return None,
    })
}

/// Day of week label, 1 is Monday
pub fn day_of_week_name(value: u8) -> Option<&'static str> {
    Some(match value {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => return None,
    })
}

/// Month label, 1 is January
pub fn month_name(value: u8) -> Option<&'static str> {
    Some(match value {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => return None,
    })
}

/// Label or the decimal value when the table has no entry
pub fn name_or_number(name: Option<&'static str>, value: u32) -> String {
    match name {
        Some(name) => name.to_string(),
        None => value.to_string(),
    }
}
