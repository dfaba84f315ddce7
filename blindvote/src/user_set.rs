use crate::*;

use std::fmt;
use std::str::FromStr;

/// A user known to the system, described by their RSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    public_key: PublicKey,
}

impl User {
    pub fn from_bytes(raw: &[u8]) -> Result<User, Error> {
        let public_key = PublicKey::with_min_length(raw, ABSOLUTE_MIN_PUBLIC_KEY_SIZE)
            .map_err(|_| Error::MalformedUser)?;
        Ok(User { public_key })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.public_key)
    }
}

/// A set of users, one base64 public key per line. Used as the admin
/// allow-list for election publication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserSet(Vec<User>);

impl UserSet {
    /// Parse a user set, skipping blank lines.
    pub fn from_bytes(raw: &[u8]) -> Result<UserSet, Error> {
        let text = std::str::from_utf8(raw).map_err(|_| Error::MalformedUser)?;
        let mut users = Vec::new();
        for line in text.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            users.push(User::from_bytes(line.as_bytes())?);
        }
        Ok(UserSet(users))
    }

    pub fn users(&self) -> &[User] {
        &self.0
    }

    /// Look up a user by public key.
    pub fn get_user(&self, public_key: &PublicKey) -> Option<&User> {
        self.0.iter().find(|u| u.public_key() == public_key)
    }
}

impl fmt::Display for UserSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(|u| u.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl FromStr for UserSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserSet::from_bytes(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_round_trip() {
        let first = PrivateKey::generate(2048).unwrap().public_key().unwrap();
        let second = PrivateKey::generate(2048).unwrap().public_key().unwrap();
        let outsider = PrivateKey::generate(2048).unwrap().public_key().unwrap();

        let raw = format!("{}\n{}", first, second);
        let users = UserSet::from_bytes(raw.as_bytes()).unwrap();
        assert_eq!(users.users().len(), 2);
        assert_eq!(users.to_string(), raw);

        assert!(users.get_user(&first).is_some());
        assert!(users.get_user(&outsider).is_none());
    }
}
