// src/watch/excludes.rs

/// Patterns appended to every block's excludes unless it sets
/// `no_common_filter`: VCS metadata, editor droppings and OS clutter.
pub const COMMON_EXCLUDES: &[&str] = &[
    "**/.git/",
    "**/.hg/",
    "**/.svn/",
    "**/.bzr/",
    "**/_darcs/",
    "**/.DS_Store",
    "**/.idea/",
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/*.swp",
    "**/*.swx",
    "**/.*.kate-swp",
    "**/4913",
    "**/node_modules/",
];
