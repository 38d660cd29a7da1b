//! Startup banner.

use crate::consts::{AUTHOR, HOMEPAGE, REPO};

/// Server configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub listen: &'a str,
    pub app_url: &'a str,
    pub auth_server: &'a str,
    pub sessions: &'a str,
    pub examples: &'a [&'a str],
}

/// Render the startup banner.
pub fn banner_text(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             S C R I B E               ║
   ║    sign here, here, and also here     ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   listen    {}
   url       {}
   auth      {}
   sessions  {}
   examples  {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.listen,
        info.app_url,
        info.auth_server,
        info.sessions,
        info.examples.join(", "),
    )
}

/// Print the startup banner.
pub fn print_banner(info: &BannerInfo) {
    println!("{}", banner_text(info));
}
