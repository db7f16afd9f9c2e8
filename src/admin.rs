//! Election administration. Only admins may use these; the backend checks
//! again, so this is about failing early with a useful message.

use crate::{
    backend::HttpBackend,
    error::{Error, Result},
    model::{Candidate, ElectionCreated, ElectionKind, ElectionUpdate},
    session::Session,
};

/// Admin operations performed as the session's user.
#[derive(Debug, Clone, Copy)]
pub struct Admin<'a> {
    backend: &'a HttpBackend,
    address: &'a str,
}

impl<'a> Admin<'a> {
    pub fn new(backend: &'a HttpBackend, session: &'a Session) -> Result<Self> {
        let address = admin_address(session)?;
        Ok(Self { backend, address })
    }

    pub async fn create_election(
        &self,
        title: &str,
        kind: ElectionKind,
        allowed_values: &[String],
    ) -> Result<ElectionCreated> {
        let title = check_election(title, kind, allowed_values)?;
        let created = self
            .backend
            .create_election(title, kind, allowed_values, self.address)
            .await?;
        info!(
            "Created election {} ({}) in transaction {}",
            created.election.id, created.election.title, created.tx_hash
        );
        Ok(created)
    }

    pub async fn add_candidate(&self, election_id: u64, name: &str) -> Result<Candidate> {
        let name = non_blank(name, "Please enter a candidate name")?;
        let candidate = self.backend.add_candidate(election_id, name, self.address).await?;
        info!("Added candidate {} to election {election_id}", candidate.name);
        Ok(candidate)
    }

    pub async fn start_election(&self, election_id: u64) -> Result<ElectionUpdate> {
        let update = self.backend.start_election(election_id, self.address).await?;
        info!("Started election {election_id}: {}", update.message);
        Ok(update)
    }

    pub async fn end_election(&self, election_id: u64) -> Result<ElectionUpdate> {
        let update = self.backend.end_election(election_id, self.address).await?;
        info!("Ended election {election_id}: {}", update.message);
        Ok(update)
    }
}

fn admin_address(session: &Session) -> Result<&str> {
    let address = session
        .address()
        .ok_or_else(|| Error::Unauthorized("User wallet address not found".to_string()))?;
    if !session.is_admin() {
        return Err(Error::Unauthorized(format!("{address} is not an administrator")));
    }
    Ok(address)
}

fn non_blank<'t>(text: &'t str, message: &str) -> Result<&'t str> {
    let text = text.trim();
    if text.is_empty() {
        Err(Error::BadRequest(message.to_string()))
    } else {
        Ok(text)
    }
}

fn check_election<'t>(title: &'t str, kind: ElectionKind, allowed_values: &[String]) -> Result<&'t str> {
    let title = non_blank(title, "Please enter an election title")?;
    if kind.is_restricted() && allowed_values.is_empty() {
        return Err(Error::BadRequest(
            "Restricted elections need at least one allowed department or program".to_string(),
        ));
    }
    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, model::User};

    #[test]
    fn only_admins() {
        let backend = HttpBackend::new(&Config::default()).unwrap();

        let anonymous = Session::default();
        assert!(matches!(
            Admin::new(&backend, &anonymous),
            Err(Error::Unauthorized(_))
        ));

        let student = Session::signed_in(User::example());
        assert!(matches!(
            Admin::new(&backend, &student),
            Err(Error::Unauthorized(_))
        ));

        let admin = Session::signed_in(User::example_admin());
        let handle = Admin::new(&backend, &admin).unwrap();
        assert_eq!(handle.address, "0xABCdef0000000000000000000000000000001234");
    }

    #[test]
    fn election_validation() {
        assert_eq!(
            check_election("  SRC President ", ElectionKind::General, &[]).unwrap(),
            "SRC President"
        );
        assert!(matches!(
            check_election("   ", ElectionKind::General, &[]),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            check_election("Class Rep", ElectionKind::Program, &[]),
            Err(Error::BadRequest(_))
        ));
        assert!(check_election(
            "Class Rep",
            ElectionKind::Program,
            &["BSc Computer Science".to_string()]
        )
        .is_ok());
    }

    #[test]
    fn candidate_name_validation() {
        assert!(matches!(
            non_blank("", "Please enter a candidate name"),
            Err(Error::BadRequest(message)) if message == "Please enter a candidate name"
        ));
        assert_eq!(non_blank(" Ada ", "unused").unwrap(), "Ada");
    }
}
