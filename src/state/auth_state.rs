use crate::models::Profile;

/// Who is signed in, as last confirmed by the backend
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub profile: Option<Profile>,
    /// A sign-in / restore request is in flight
    pub busy: bool,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.profile.is_some()
    }

    pub fn sign_in(&mut self, profile: Profile) {
        log::info!("[Auth] Signed in as {}", profile.name);
        self.profile = Some(profile);
        self.busy = false;
    }

    pub fn sign_out(&mut self) {
        self.profile = None;
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let mut auth = AuthState {
            busy: true,
            ..AuthState::default()
        };
        assert!(!auth.is_logged_in());

        auth.sign_in(Profile {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            verified: true,
            avatar: None,
            followers: 0,
            followings: 0,
        });
        assert!(auth.is_logged_in());
        assert!(!auth.busy);

        auth.sign_out();
        assert!(!auth.is_logged_in());
    }
}
