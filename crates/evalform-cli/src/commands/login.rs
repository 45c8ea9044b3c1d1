//! The `evalform login` and `evalform logout` commands.

use std::path::PathBuf;

use anyhow::Result;

use evalform_core::model::UserProfile;
use evalform_stores::config::load_config_from;
use evalform_stores::identity::{store_user, USER_KEY};
use evalform_stores::LocalState;

fn local_state(state_file: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<LocalState> {
    let path = match state_file {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.state_file,
    };
    Ok(LocalState::new(path))
}

pub fn login(name: String, state_file: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "name must not be empty");

    let state = local_state(state_file, config_path)?;
    store_user(&state, &UserProfile::new(name.trim()))?;
    println!("Logged in as {} ({})", name.trim(), state.path().display());

    Ok(())
}

pub fn logout(state_file: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let state = local_state(state_file, config_path)?;
    if state.remove_item(USER_KEY)? {
        println!("Logged out.");
    } else {
        println!("No user logged in.");
    }

    Ok(())
}
