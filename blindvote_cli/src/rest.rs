use blindvote::{
    Ballot, Election, FulfilledSignatureRequest, PrivateKey, PublicKey, SignatureRequest,
};
use std::error::Error;

/// REST client for the election clerk server.
pub struct ClerkClient {
    base_uri: String,
    client: reqwest::blocking::Client,
}

impl ClerkClient {
    pub fn new(base_uri: &str) -> ClerkClient {
        ClerkClient {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn get_public_key(&self) -> Result<PublicKey, Box<dyn Error>> {
        let full_uri = format!("{}/publickey", self.base_uri);
        let res = self.client.get(&full_uri).send()?;
        let body = check(res)?;
        Ok(PublicKey::from_pem(&body)?)
    }

    pub fn get_election(&self, election_id: &str) -> Result<Election, Box<dyn Error>> {
        let full_uri = format!("{}/election/{}", self.base_uri, election_id);
        let res = self.client.get(&full_uri).send()?;
        let body = check(res)?;
        Ok(Election::from_bytes(body.as_bytes())?)
    }

    /// PUT an election, authenticated with signed-request headers under
    /// the given RSA key.
    pub fn put_election(
        &self,
        election: &Election,
        signing_key: &PrivateKey,
    ) -> Result<(), Box<dyn Error>> {
        let path = format!("/election/{}", election.election_id);
        let full_uri = format!("{}{}", self.base_uri, path);

        let signature = signing_key.sign_raw(format!("PUT {}", path).as_bytes())?;
        let res = self
            .client
            .put(&full_uri)
            .header("X-Public-Key", hex::encode(election.public_key.bytes()))
            .header(
                "X-Signature-Key",
                signing_key.public_key()?.to_string(),
            )
            .header("X-Signature", signature.to_string())
            .body(election.to_string())
            .send()?;
        check(res)?;
        Ok(())
    }

    pub fn post_signature_request(
        &self,
        request: &SignatureRequest,
    ) -> Result<FulfilledSignatureRequest, Box<dyn Error>> {
        let full_uri = format!("{}/sign", self.base_uri);
        let res = self
            .client
            .post(&full_uri)
            .body(request.to_string())
            .send()?;
        let body = check(res)?;
        Ok(FulfilledSignatureRequest::from_bytes(body.as_bytes())?)
    }
}

/// REST client for the ballot box server.
pub struct BoxClient {
    base_uri: String,
    client: reqwest::blocking::Client,
}

impl BoxClient {
    pub fn new(base_uri: &str) -> BoxClient {
        BoxClient {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn put_ballot(&self, ballot: &Ballot) -> Result<(), Box<dyn Error>> {
        let full_uri = format!(
            "{}/vote/{}/{}",
            self.base_uri, ballot.election_id, ballot.ballot_id
        );
        let res = self
            .client
            .put(&full_uri)
            .body(ballot.to_string())
            .send()?;
        check(res)?;
        Ok(())
    }

    pub fn get_ballot(
        &self,
        election_id: &str,
        ballot_id: &str,
    ) -> Result<Ballot, Box<dyn Error>> {
        let full_uri = format!("{}/vote/{}/{}", self.base_uri, election_id, ballot_id);
        let res = self.client.get(&full_uri).send()?;
        let body = check(res)?;
        Ok(Ballot::from_bytes(body.as_bytes())?)
    }

    pub fn get_roll(&self, election_id: &str) -> Result<Vec<Ballot>, Box<dyn Error>> {
        let full_uri = format!("{}/vote/{}", self.base_uri, election_id);
        let res = self.client.get(&full_uri).send()?;
        let body = check(res)?;

        let mut ballots = Vec::new();
        for raw in body.split("\n\n\n") {
            if raw.is_empty() {
                continue;
            }
            ballots.push(Ballot::from_bytes(raw.as_bytes())?);
        }
        Ok(ballots)
    }
}

fn check(res: reqwest::blocking::Response) -> Result<String, Box<dyn Error>> {
    let status = res.status();
    let body = res.text()?;
    if !status.is_success() {
        return Err(format!("{}: {}", status, body.trim_end()).into());
    }
    Ok(body)
}
