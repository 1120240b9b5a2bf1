// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use tripclip::db::{DB_ENV, resolve_db_path};

// One test owns the process environment for this binary.
#[cfg(unix)]
#[test]
fn db_path_precedence_flag_then_env_then_data_dir() {
    let home = tempfile::tempdir().unwrap();
    let env_path = home.path().join("from-env.sqlite");
    unsafe {
        std::env::set_var("HOME", home.path());
        std::env::set_var("XDG_DATA_HOME", home.path().join("data"));
        std::env::set_var(DB_ENV, &env_path);
    }

    // flag beats the env var
    let p = resolve_db_path(Some("/tmp/flag.sqlite")).unwrap();
    assert_eq!(p, PathBuf::from("/tmp/flag.sqlite"));

    // a blank flag does not count
    assert_eq!(resolve_db_path(Some("   ")).unwrap(), env_path);

    // env var beats the data dir
    assert_eq!(resolve_db_path(None).unwrap(), env_path);

    // empty env var falls through to the data dir
    unsafe {
        std::env::set_var(DB_ENV, "");
    }
    let p = resolve_db_path(None).unwrap();
    assert!(p.starts_with(home.path()), "{}", p.display());
    assert_eq!(p.file_name().unwrap(), "tripclip.sqlite");
    assert!(p.parent().unwrap().is_dir());

    unsafe {
        std::env::remove_var(DB_ENV);
    }
    assert_eq!(resolve_db_path(None).unwrap(), p);
}
