//! Command-line parsing.

use parkhub_domain::id::ParkingLotId;

pub const USAGE: &str = "\
usage: parkhubctl <command>

commands:
  lots            list parking lots
  show <id>       print one parking lot
  history <id>    print the status history of a parking lot
  watch <id>      print the history, then stream live status changes until Ctrl-C
  delete <id>     delete a parking lot and its stored images
  owners          list users that can own a parking lot
  nodes           list nodes that can report for a parking lot
  help            print this message

configuration: parkhub.toml, PARKHUB_API_URL, PARKHUB_SOCKET_URL, PARKHUB_TOKEN,
PARKHUB_EMAIL, PARKHUB_PASSWORD, PARKHUB_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lots,
    Show(ParkingLotId),
    History(ParkingLotId),
    Watch(ParkingLotId),
    Delete(ParkingLotId),
    Owners,
    Nodes,
    Help,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{0} requires a parking lot id")]
    MissingId(&'static str),

    #[error("unexpected argument {0:?}")]
    UnexpectedArgument(String),
}

impl Command {
    /// Parse the arguments following the program name.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError`] for a missing or unknown command, a missing
    /// id, or trailing arguments.
    pub fn parse<I>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let name = args.next().ok_or(UsageError::MissingCommand)?;
        let command = match name.as_str() {
            "lots" | "list" => Self::Lots,
            "show" => Self::Show(id(&mut args, "show")?),
            "history" => Self::History(id(&mut args, "history")?),
            "watch" => Self::Watch(id(&mut args, "watch")?),
            "delete" => Self::Delete(id(&mut args, "delete")?),
            "owners" => Self::Owners,
            "nodes" => Self::Nodes,
            "help" | "-h" | "--help" => Self::Help,
            _ => return Err(UsageError::UnknownCommand(name)),
        };
        match args.next() {
            Some(extra) => Err(UsageError::UnexpectedArgument(extra)),
            None => Ok(command),
        }
    }
}

fn id(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<ParkingLotId, UsageError> {
    args.next()
        .filter(|id| !id.trim().is_empty())
        .map(ParkingLotId::new)
        .ok_or(UsageError::MissingId(command))
}
