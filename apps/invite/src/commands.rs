#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Name,
    Attending,
    Guests,
    Diet,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open,
    Next,
    Back,
    Go(usize),
    Submit,
    Set(Field, String),
    Status,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  open                 open the invitation
  next | back          move one step
  go <n>               jump to step n (1-5)
  submit               send the RSVP and continue
  set <field> <value>  field: name, attending, guests, diet, note
  status | show | help | quit";

/// Parses one input line; the error is shown to the guest as-is.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    match word.to_ascii_lowercase().as_str() {
        "open" => Ok(Command::Open),
        "next" | "n" => Ok(Command::Next),
        "back" | "prev" | "b" => Ok(Command::Back),
        "go" => {
            let n: usize = rest
                .parse()
                .map_err(|_| format!("'{rest}' is not a step number"))?;
            if n == 0 {
                return Err("steps are numbered from 1".into());
            }
            Ok(Command::Go(n - 1))
        }
        "submit" => Ok(Command::Submit),
        "set" => parse_set(rest),
        "status" => Ok(Command::Status),
        "show" | "" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn parse_set(rest: &str) -> Result<Command, String> {
    let (field, value) = rest
        .split_once(char::is_whitespace)
        .map(|(f, v)| (f, v.trim()))
        .unwrap_or((rest, ""));
    let field = match field.to_ascii_lowercase().as_str() {
        "name" => Field::Name,
        "attending" => Field::Attending,
        "guests" => Field::Guests,
        "diet" => Field::Diet,
        "note" => Field::Note,
        other => return Err(format!("unknown field '{other}'")),
    };
    Ok(Command::Set(field, value.to_string()))
}
