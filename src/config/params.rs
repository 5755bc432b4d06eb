//! Parameter descriptors for console access.

use super::LinkConfig;

/// Typed parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    U32(u32),
    Bool(bool),
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParamValue::U32(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Parameter type with its accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    U32 { min: u32, max: u32 },
}

/// Why a value was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSetError {
    /// Text does not parse as the parameter's type.
    Invalid,
    /// Parsed, but outside `min..=max`.
    OutOfRange,
}

impl ParamType {
    /// Parse and range-check console input.
    pub fn parse(self, text: &str) -> Result<ParamValue, ParamSetError> {
        match self {
            ParamType::Bool => match text {
                "true" | "1" | "on" => Ok(ParamValue::Bool(true)),
                "false" | "0" | "off" => Ok(ParamValue::Bool(false)),
                _ => Err(ParamSetError::Invalid),
            },
            ParamType::U32 { min, max } => {
                let v: u32 = text.parse().map_err(|_| ParamSetError::Invalid)?;
                if v < min || v > max {
                    return Err(ParamSetError::OutOfRange);
                }
                Ok(ParamValue::U32(v))
            }
        }
    }
}

/// One console-visible parameter.
pub struct ParamDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub param_type: ParamType,
    pub get_fn: fn(&LinkConfig) -> ParamValue,
    pub set_fn: fn(&LinkConfig, ParamValue),
}

impl ParamDescriptor {
    /// Parse `text` and store it.
    pub fn apply(&self, config: &LinkConfig, text: &str) -> Result<ParamValue, ParamSetError> {
        let value = self.param_type.parse(text)?;
        (self.set_fn)(config, value);
        Ok(value)
    }
}

fn as_u32(v: ParamValue) -> u32 {
    match v {
        ParamValue::U32(n) => n,
        ParamValue::Bool(b) => b as u32,
    }
}

fn as_bool(v: ParamValue) -> bool {
    match v {
        ParamValue::Bool(b) => b,
        ParamValue::U32(n) => n != 0,
    }
}

/// All parameters, sorted by name.
pub static PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "link.char_delay_us",
        brief: "Pause after each TX byte",
        param_type: ParamType::U32 { min: 0, max: 10_000 },
        get_fn: |c| ParamValue::U32(c.char_delay_us()),
        set_fn: |c, v| c.set_char_delay_us(as_u32(v)),
    },
    ParamDescriptor {
        name: "link.dtr_poll_ms",
        brief: "DTR poll period at startup",
        param_type: ParamType::U32 { min: 1, max: 10_000 },
        get_fn: |c| ParamValue::U32(c.dtr_poll_ms()),
        set_fn: |c, v| c.set_dtr_poll_ms(as_u32(v)),
    },
    ParamDescriptor {
        name: "link.idle_poll_ms",
        brief: "Wait step while TX is busy",
        param_type: ParamType::U32 { min: 1, max: 1_000 },
        get_fn: |c| ParamValue::U32(c.idle_poll_ms()),
        set_fn: |c, v| c.set_idle_poll_ms(as_u32(v)),
    },
    ParamDescriptor {
        name: "link.log_rx",
        brief: "Log received lines",
        param_type: ParamType::Bool,
        get_fn: |c| ParamValue::Bool(c.log_rx()),
        set_fn: |c, v| c.set_log_rx(as_bool(v)),
    },
    ParamDescriptor {
        name: "link.tx_timeout_ms",
        brief: "TX confirmation timeout",
        param_type: ParamType::U32 { min: 1, max: 60_000 },
        get_fn: |c| ParamValue::U32(c.tx_timeout_ms()),
        set_fn: |c, v| c.set_tx_timeout_ms(as_u32(v)),
    },
];

/// Find parameter by exact name.
pub fn find_param(name: &str) -> Option<&'static ParamDescriptor> {
    PARAMS.iter().find(|p| p.name == name)
}

/// Parameters matching `prefix*` (a trailing `*` is optional).
pub fn find_params_matching(pattern: &str) -> impl Iterator<Item = &'static ParamDescriptor> + '_ {
    let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
    PARAMS.iter().filter(move |p| p.name.starts_with(prefix))
}
