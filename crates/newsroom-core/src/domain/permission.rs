use std::fmt;

/// Capabilities a session identity can carry.
///
/// The codename is what travels inside the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    AddPost,
    ChangePost,
    DeletePost,
}

impl Permission {
    pub fn codename(self) -> &'static str {
        match self {
            Permission::AddPost => "news.add_post",
            Permission::ChangePost => "news.change_post",
            Permission::DeletePost => "news.delete_post",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}
