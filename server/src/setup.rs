//! Access to the configuration from environment variables (possibly loaded from a `.env` file)
use std::env;
use std::env::VarError;
use std::fmt::{Display, Formatter};

const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1";
const DEFAULT_LISTEN_PORT: u16 = 3001;

/// Get the database URL from the environment variable "DATABASE_URL". It is mandatory.
pub fn get_database_url_from_env() -> Result<String, SetupError> {
    env::var("DATABASE_URL").map_err(|e| SetupError::from_env_error(e, "DATABASE_URL"))
}

/// Get the web server TCP listening port from the environment variable "LISTEN_PORT"
///
/// Defaults to 3001 if the variable is not set.
pub fn get_listen_port_from_env() -> Result<u16, SetupError> {
    match optional_env_var("LISTEN_PORT")? {
        None => Ok(DEFAULT_LISTEN_PORT),
        Some(v) => v.parse().map_err(|_| SetupError::EnvVariableInvalid {
            variable_name: "LISTEN_PORT",
            problem: "Not a valid uint16",
        }),
    }
}

/// Get the web server TCP listening interface address from the environment variable
/// "LISTEN_ADDRESS"
///
/// Defaults to the IPv4 loopback interface.
pub fn get_listen_address_from_env() -> Result<String, SetupError> {
    Ok(optional_env_var("LISTEN_ADDRESS")?.unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_owned()))
}

fn optional_env_var(variable_name: &'static str) -> Result<Option<String>, SetupError> {
    match env::var(variable_name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(SetupError::from_env_error(e, variable_name)),
    }
}

#[derive(Debug)]
pub enum SetupError {
    EnvVariableMissing {
        variable_name: &'static str,
    },
    EnvVariableInvalid {
        variable_name: &'static str,
        problem: &'static str,
    },
}

impl SetupError {
    fn from_env_error(error: VarError, variable_name: &'static str) -> Self {
        match error {
            VarError::NotPresent => Self::EnvVariableMissing { variable_name },
            VarError::NotUnicode(_) => Self::EnvVariableInvalid {
                variable_name,
                problem: "no valid unicode",
            },
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvVariableMissing { variable_name } => {
                write!(f, "Environment variable {} must be defined", variable_name)
            }
            SetupError::EnvVariableInvalid {
                variable_name,
                problem,
            } => write!(
                f,
                "Value of environment variable {} is invalid: {}",
                variable_name, problem
            ),
        }
    }
}
