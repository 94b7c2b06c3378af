/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session identity.

use std::fmt;

/// Identifies a FIX session by its BeginString, CompIDs and optional qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    /// FIX version string (e.g., "FIX.4.4").
    pub begin_string: String,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
    /// Disambiguates sessions sharing the same CompIDs.
    pub session_qualifier: Option<String>,
}

impl SessionId {
    /// Creates a new session ID.
    ///
    /// # Arguments
    /// * `begin_string` - FIX version string
    /// * `sender_comp_id` - Sender CompID
    /// * `target_comp_id` - Target CompID
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            session_qualifier: None,
        }
    }

    /// Sets the session qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.session_qualifier = Some(qualifier.into());
        self
    }

    /// File name stem used by stores and audit logs, e.g. `FIX.4.4-CLIENT-BROKER`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        let mut stem = format!(
            "{}-{}-{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        );
        if let Some(qualifier) = &self.session_qualifier {
            stem.push('-');
            stem.push_str(qualifier);
        }
        stem
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )?;
        if let Some(qualifier) = &self.session_qualifier {
            write!(f, ":{qualifier}")?;
        }
        Ok(())
    }
}
