use crate::*;

use std::fmt;
use std::str::FromStr;

/// An ordered list of choices: first preference first. Equality is by
/// positional sequence. The canonical form is one choice per line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vote(Vec<String>);

impl Vote {
    /// Parse a vote from its canonical bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Vote, Error> {
        if raw.len() > MAX_VOTE_SIZE {
            return Err(Error::VoteTooBig);
        }

        let text = std::str::from_utf8(raw).map_err(|_| Error::VoteChoiceInvalid)?;
        let mut choices = Vec::new();
        for choice in text.split('\n') {
            choices.push(parse_choice(choice)?);
        }
        if choices.len() > MAX_VOTE_CHOICES {
            return Err(Error::VoteTooManyChoices);
        }

        Ok(Vote(choices))
    }

    /// Build a vote from a list of choices, validating each.
    pub fn from_choices<S: Into<String>>(choices: Vec<S>) -> Result<Vote, Error> {
        let mut validated = Vec::with_capacity(choices.len());
        for choice in choices {
            validated.push(parse_choice(&choice.into())?);
        }
        if validated.len() > MAX_VOTE_CHOICES {
            return Err(Error::VoteTooManyChoices);
        }
        Ok(Vote(validated))
    }

    pub fn choices(&self) -> &[String] {
        &self.0
    }

    /// The first preference, if any.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|s| s.as_str())
    }
}

fn parse_choice(choice: &str) -> Result<String, Error> {
    if choice.len() > MAX_VOTE_CHOICE_SIZE {
        return Err(Error::VoteChoiceTooBig);
    }
    if !VALID_VOTE_CHOICE.is_match(choice) {
        return Err(Error::VoteChoiceInvalid);
    }
    Ok(choice.to_string())
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}

impl FromStr for Vote {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vote::from_bytes(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let raw = b"candidate-a\ncandidate-b";
        let vote = Vote::from_bytes(raw).unwrap();
        assert_eq!(vote.choices(), ["candidate-a", "candidate-b"]);
        assert_eq!(vote.to_string().as_bytes(), raw);
    }

    #[test]
    fn order_is_significant() {
        let ab = Vote::from_bytes(b"a\nb").unwrap();
        let ba = Vote::from_bytes(b"b\na").unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn rejects_bad_choices() {
        assert!(Vote::from_bytes(b"ok\n\x07bell").is_err());

        let long = "x".repeat(MAX_VOTE_CHOICE_SIZE + 1);
        assert!(matches!(
            Vote::from_bytes(long.as_bytes()),
            Err(Error::VoteChoiceTooBig)
        ));

        let many = vec!["c"; MAX_VOTE_CHOICES + 1];
        assert!(matches!(
            Vote::from_choices(many),
            Err(Error::VoteTooManyChoices)
        ));
    }
}
