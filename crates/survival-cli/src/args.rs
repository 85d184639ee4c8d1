use anyhow::{anyhow, bail, Context, Result};
use survival_core::{PassengerAttributes, PredictRequest};

pub const USAGE: &str = "\
Usage: survival-cli [OPTIONS]

Passenger:
  --age <N>         age in years, 0-100 (default 30)
  --sex <S>         male | female (default male)
  --class <C>       1 | 2 | 3 (default 2)
  --siblings <N>    siblings/spouses aboard, 0-10 (default 0)
  --parents <N>     parents/children aboard, 0-10 (default 0)

Target:
  --gateway <URL>   prediction gateway base URL (default $GATEWAY_URL or http://localhost:3000)
  --direct          call the inference endpoint directly ($INFERENCE_URL)
  -h, --help        print this help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Gateway(String),
    Direct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub request: PredictRequest,
    pub target: Target,
}

/// Parses command-line flags. Returns `Ok(None)` when help was requested.
///
/// Values are only parsed as numbers here; domain checks happen when the
/// request is converted into `PassengerAttributes`.
pub fn parse_args<I>(args: I, default_gateway: &str) -> Result<Option<CliArgs>>
where
    I: IntoIterator<Item = String>,
{
    let mut request = PredictRequest::from(&PassengerAttributes::default());
    let mut gateway = default_gateway.to_string();
    let mut direct = false;

    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-h" | "--help" => return Ok(None),
            "--direct" => direct = true,
            "--age" => request.age = number(&flag, args.next())?,
            "--siblings" => request.siblings = number(&flag, args.next())?,
            "--parents" => request.parents = number(&flag, args.next())?,
            "--sex" => request.sex = value(&flag, args.next())?,
            "--class" => request.passenger_class = value(&flag, args.next())?,
            "--gateway" => gateway = value(&flag, args.next())?,
            other => bail!("unknown argument {other:?}\n\n{USAGE}"),
        }
    }

    let target = if direct {
        Target::Direct
    } else {
        Target::Gateway(gateway)
    };
    Ok(Some(CliArgs { request, target }))
}

fn value(flag: &str, next: Option<String>) -> Result<String> {
    next.ok_or_else(|| anyhow!("{flag} expects a value"))
}

fn number(flag: &str, next: Option<String>) -> Result<f64> {
    let raw = value(flag, next)?;
    raw.trim()
        .parse()
        .with_context(|| format!("{flag} expects a number, got {raw:?}"))
}
