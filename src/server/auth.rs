use anyhow::{bail, Result};

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::{collections::HashMap, time::SystemTime};

pub type UserHandle = String;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub user_handle: UserHandle,
    pub created: SystemTime,
    pub last_used: SystemTime,
    pub value: AuthTokenValue,
}

impl AuthTokenValue {
    fn generate() -> AuthTokenValue {
        let random_string: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct UserAuthCredentials {
    pub user_handle: UserHandle,
    pub created: SystemTime,
    pub salt: String,
    pub hash: String,
    pub hasher: QuestifyHasher,
}

pub trait AuthStore: Send + Sync {
    fn load_auth_credentials(&self) -> Result<HashMap<UserHandle, UserAuthCredentials>>;
    fn update_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()>;
    fn delete_auth_credentials(&self, user_handle: &str) -> Result<()>;

    fn load_auth_tokens(&self) -> Result<HashMap<AuthTokenValue, AuthToken>>;
    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<()>;
    fn add_auth_token(&self, token: &AuthToken) -> Result<()>;
}

/// Identity verification boundary: password login issuing opaque bearer
/// tokens, verified per request by the session extractor.
pub struct AuthManager {
    store: Box<dyn AuthStore>,
    credentials: HashMap<UserHandle, UserAuthCredentials>,
    auth_tokens: HashMap<AuthTokenValue, AuthToken>,
}

impl AuthManager {
    pub fn initialize(store: Box<dyn AuthStore>) -> Result<AuthManager> {
        let credentials = store.load_auth_credentials()?;
        let auth_tokens = store.load_auth_tokens()?;
        Ok(AuthManager {
            store,
            credentials,
            auth_tokens,
        })
    }

    pub fn login(&mut self, user_handle: &str, password: &str) -> Result<AuthTokenValue> {
        let credentials = match self.credentials.get(user_handle) {
            Some(x) => x,
            None => bail!("Unknown user \"{}\"", user_handle),
        };
        if !credentials.hasher.verify(password, &credentials.hash)? {
            bail!("Invalid password for user \"{}\"", user_handle);
        }

        let now = SystemTime::now();
        let token = AuthToken {
            user_handle: user_handle.to_owned(),
            created: now,
            last_used: now,
            value: AuthTokenValue::generate(),
        };
        self.store.add_auth_token(&token)?;
        let value = token.value.clone();
        self.auth_tokens.insert(value.clone(), token);
        Ok(value)
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Option<AuthToken> {
        self.auth_tokens.get(value).cloned()
    }

    pub fn delete_auth_token(&mut self, value: &AuthTokenValue) -> Result<()> {
        if self.auth_tokens.remove(value).is_none() {
            bail!("No such auth token");
        }
        self.store.delete_auth_token(value)
    }

    pub fn create_password_credentials(
        &mut self,
        user_handle: &str,
        password: String,
    ) -> Result<()> {
        if self.credentials.contains_key(user_handle) {
            bail!("User \"{}\" already has credentials", user_handle);
        }
        self.upsert_password_credentials(user_handle, password)
    }

    pub fn update_password_credentials(
        &mut self,
        user_handle: &str,
        password: String,
    ) -> Result<()> {
        if !self.credentials.contains_key(user_handle) {
            bail!("User \"{}\" has no credentials", user_handle);
        }
        self.upsert_password_credentials(user_handle, password)
    }

    pub fn delete_password_credentials(&mut self, user_handle: &str) -> Result<()> {
        if self.credentials.remove(user_handle).is_none() {
            bail!("User \"{}\" has no credentials", user_handle);
        }
        self.store.delete_auth_credentials(user_handle)
    }

    fn upsert_password_credentials(&mut self, user_handle: &str, password: String) -> Result<()> {
        let hasher = QuestifyHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        let credentials = UserAuthCredentials {
            user_handle: user_handle.to_owned(),
            created: SystemTime::now(),
            salt,
            hash,
            hasher,
        };
        self.store.update_auth_credentials(credentials.clone())?;
        self.credentials.insert(user_handle.to_owned(), credentials);
        Ok(())
    }
}

mod questify_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub enum QuestifyHasher {
    Argon2,
}

impl QuestifyHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            QuestifyHasher::Argon2 => questify_argon2::generate_b64_salt(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            QuestifyHasher::Argon2 => questify_argon2::hash(plain, b64_salt),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: T, target_hash: T) -> Result<bool> {
        match self {
            QuestifyHasher::Argon2 => {
                questify_argon2::verify(plain_pw.as_ref().as_bytes(), target_hash)
            }
        }
    }
}
