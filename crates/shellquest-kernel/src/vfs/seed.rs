//! The fixed starter layout every new filesystem is seeded with.

use super::FileNode;

/// Segments of the adventurer's home directory (the initial CWD).
pub const HOME_SEGMENTS: [&str; 2] = ["home", "adventurer"];

/// Build the starter tree.
pub fn starter_layout() -> FileNode {
    let adventurer = FileNode::dir()
        .with_child("notes.txt", FileNode::file("Welcome to ShellQuest!"))
        .with_child("tutorials", FileNode::dir())
        .with_child(
            "forest",
            FileNode::dir().with_child("trail.txt", FileNode::file("Watch the roots.")),
        )
        .with_child(
            "caves",
            FileNode::dir().with_child("echo.txt", FileNode::file("echo echo echo")),
        );

    FileNode::dir().with_child("home", FileNode::dir().with_child("adventurer", adventurer))
}
