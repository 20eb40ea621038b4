//! Plain-text rendering for command output.

use std::fmt::Write;

use assethub_core::asset::Asset;
use assethub_core::tag::Tag;
use assethub_core::user::User;

pub fn asset_table(assets: &[Asset]) -> String {
    if assets.is_empty() {
        return "No assets\n".to_string();
    }

    let name_width = assets
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!("{:>6}  {:<name_width$}  {:<24}  URL\n", "ID", "NAME", "TAGS");
    for asset in assets {
        let _ = writeln!(
            out,
            "{:>6}  {:<name_width$}  {:<24}  {}",
            asset.id,
            asset.name,
            asset.tag_names().join(", "),
            asset.url.as_deref().unwrap_or("-"),
        );
    }
    out
}

pub fn tag_table(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "No tags\n".to_string();
    }
    let mut out = format!("{:>6}  NAME\n", "ID");
    for tag in tags {
        let _ = writeln!(out, "{:>6}  {}", tag.id, tag.name);
    }
    out
}

pub fn user_line(user: &User) -> String {
    match (&user.username, &user.email) {
        (Some(name), Some(email)) => format!("{name} <{email}> (id {})", user.id),
        (Some(name), None) => format!("{name} (id {})", user.id),
        (None, Some(email)) => format!("{email} (id {})", user.id),
        (None, None) => format!("user {}", user.id),
    }
}
