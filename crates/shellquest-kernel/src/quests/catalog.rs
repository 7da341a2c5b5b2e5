//! The built-in zones and quests.

use super::{QuestCheck, QuestDefinition, Zone, ZoneId};
use crate::progression::{Reward, Skill};

pub const ZONES: &[Zone] = &[
    Zone {
        id: ZoneId::TerminalPlains,
        name: "Terminal Plains",
    },
    Zone {
        id: ZoneId::FilewoodForest,
        name: "Filewood Forest",
    },
    Zone {
        id: ZoneId::GrepCaves,
        name: "Grep Caves",
    },
];

const fn reward(xp: u64, coins: u64, skill: Skill) -> Reward {
    Reward {
        xp,
        coins,
        skill: Some(skill),
    }
}

pub const QUESTS: &[QuestDefinition] = &[
    // Terminal Plains
    QuestDefinition {
        id: "plains-help",
        zone: ZoneId::TerminalPlains,
        title: "Meet the Shell",
        intro: "Explore the basics of ShellQuest.",
        goal: "Use the help command to see available actions.",
        hints: &["Type `help` and press enter."],
        check: QuestCheck::CommandUsed("help"),
        reward: reward(15, 5, Skill::Navigation),
    },
    QuestDefinition {
        id: "plains-clear",
        zone: ZoneId::TerminalPlains,
        title: "Fresh Screen",
        intro: "A clear view is a calm mind.",
        goal: "Clear the terminal.",
        hints: &["Type `clear` to wipe the log."],
        check: QuestCheck::CommandUsed("clear"),
        reward: reward(15, 5, Skill::Navigation),
    },
    QuestDefinition {
        id: "plains-pwd",
        zone: ZoneId::TerminalPlains,
        title: "Where am I?",
        intro: "Location matters in the Plains.",
        goal: "Check your working directory.",
        hints: &["Use `pwd` to print the working directory."],
        check: QuestCheck::CommandUsed("pwd"),
        reward: reward(20, 6, Skill::Navigation),
    },
    QuestDefinition {
        id: "plains-ls",
        zone: ZoneId::TerminalPlains,
        title: "Survey the Fields",
        intro: "List what is around you.",
        goal: "Run ls to list the contents of the Plains.",
        hints: &["`ls` shows files and folders."],
        check: QuestCheck::CommandUsed("ls"),
        reward: reward(20, 6, Skill::Navigation),
    },
    QuestDefinition {
        id: "plains-cd",
        zone: ZoneId::TerminalPlains,
        title: "Step into Tutorials",
        intro: "Move between locations.",
        goal: "Change directory into the tutorials folder.",
        hints: &["`cd tutorials` should do it."],
        check: QuestCheck::PathVisited("/home/adventurer/tutorials"),
        reward: reward(25, 7, Skill::Navigation),
    },
    QuestDefinition {
        id: "plains-mkdir",
        zone: ZoneId::TerminalPlains,
        title: "Make Space",
        intro: "You can build your own corners.",
        goal: "Create a directory named practice.",
        hints: &["`mkdir practice` while in your home folder."],
        check: QuestCheck::NodeExists("/home/adventurer/practice"),
        reward: reward(25, 8, Skill::Files),
    },
    QuestDefinition {
        id: "plains-touch",
        zone: ZoneId::TerminalPlains,
        title: "First Note",
        intro: "Create your own file.",
        goal: "Use touch to create start.txt.",
        hints: &["`touch start.txt`"],
        check: QuestCheck::NodeExists("start.txt"),
        reward: reward(25, 8, Skill::Files),
    },
    QuestDefinition {
        id: "plains-cat",
        zone: ZoneId::TerminalPlains,
        title: "Read the Welcome",
        intro: "The Plains have simple lore.",
        goal: "Read notes.txt using cat.",
        hints: &["`cat notes.txt` from your home folder."],
        check: QuestCheck::CommandUsed("cat notes.txt"),
        reward: reward(30, 10, Skill::Text),
    },
    // Filewood Forest
    QuestDefinition {
        id: "forest-cat-trail",
        zone: ZoneId::FilewoodForest,
        title: "Follow the Trail",
        intro: "Stories are etched into the woods.",
        goal: "Read forest/trail.txt.",
        hints: &["Try `cat forest/trail.txt`."],
        check: QuestCheck::CommandUsed("cat forest/trail.txt"),
        reward: reward(30, 12, Skill::Text),
    },
    QuestDefinition {
        id: "forest-touch-log",
        zone: ZoneId::FilewoodForest,
        title: "Write a Log",
        intro: "Record your travels.",
        goal: "Create travel.log with touch.",
        hints: &["`touch travel.log`"],
        check: QuestCheck::NodeExists("travel.log"),
        reward: reward(30, 12, Skill::Files),
    },
    QuestDefinition {
        id: "forest-mkdir",
        zone: ZoneId::FilewoodForest,
        title: "Build a Camp",
        intro: "Prepare a base in the woods.",
        goal: "Make a directory named camp.",
        hints: &["`mkdir camp`"],
        check: QuestCheck::NodeExists("camp"),
        reward: reward(30, 12, Skill::Files),
    },
    QuestDefinition {
        id: "forest-echo",
        zone: ZoneId::FilewoodForest,
        title: "Leave a Message",
        intro: "Trees remember what you write.",
        goal: "Use echo to create camp/todo.txt with text.",
        hints: &["`echo \"gather wood\" > camp/todo.txt`"],
        check: QuestCheck::FileContains {
            path: "/home/adventurer/camp/todo.txt",
            needle: "gather",
        },
        reward: reward(35, 14, Skill::Text),
    },
    QuestDefinition {
        id: "forest-rm",
        zone: ZoneId::FilewoodForest,
        title: "Clear the Path",
        intro: "Remove obstacles when needed.",
        goal: "Delete travel.log.",
        hints: &["Create it with touch if you have not, then `rm travel.log`."],
        check: QuestCheck::All(&[
            QuestCheck::CommandContains(&["rm", "travel.log"]),
            QuestCheck::NodeAbsent("travel.log"),
        ]),
        reward: reward(35, 14, Skill::Files),
    },
    QuestDefinition {
        id: "forest-cat-plan",
        zone: ZoneId::FilewoodForest,
        title: "Read the Plan",
        intro: "Plans guide your steps.",
        goal: "Read camp/todo.txt.",
        hints: &["`cat camp/todo.txt`"],
        check: QuestCheck::CommandUsed("cat camp/todo.txt"),
        reward: reward(35, 14, Skill::Text),
    },
    QuestDefinition {
        id: "forest-cd-camp",
        zone: ZoneId::FilewoodForest,
        title: "Enter the Camp",
        intro: "Move into your new base.",
        goal: "cd into camp directory.",
        hints: &["`cd camp`"],
        check: QuestCheck::PathVisited("/home/adventurer/camp"),
        reward: reward(35, 14, Skill::Navigation),
    },
    QuestDefinition {
        id: "forest-ls-grep",
        zone: ZoneId::FilewoodForest,
        title: "Filter the Underbrush",
        intro: "Use a pipe to find files.",
        goal: "Run ls piped to grep for txt.",
        hints: &["`ls | grep txt`"],
        check: QuestCheck::CommandContains(&["ls", "|", "grep"]),
        reward: reward(40, 16, Skill::Text),
    },
    QuestDefinition {
        id: "forest-grep-roots",
        zone: ZoneId::FilewoodForest,
        title: "Search the Roots",
        intro: "Find mentions of roots.",
        goal: "Use grep to find \"roots\" in forest/trail.txt.",
        hints: &["`grep roots forest/trail.txt`"],
        check: QuestCheck::CommandUsed("grep roots forest/trail.txt"),
        reward: reward(40, 16, Skill::Text),
    },
    // Grep Caves
    QuestDefinition {
        id: "caves-echo-repeat",
        zone: ZoneId::GrepCaves,
        title: "Echoes in the Cave",
        intro: "Find the repeating voice.",
        goal: "Read caves/echo.txt with grep to find echo.",
        hints: &["`grep echo caves/echo.txt`"],
        check: QuestCheck::CommandUsed("grep echo caves/echo.txt"),
        reward: reward(45, 18, Skill::Text),
    },
    QuestDefinition {
        id: "caves-touch-journal",
        zone: ZoneId::GrepCaves,
        title: "Document the Echoes",
        intro: "Create a journal.",
        goal: "Create journal.txt and add a line to it.",
        hints: &["`touch journal.txt` then echo into it."],
        check: QuestCheck::FileContains {
            path: "journal.txt",
            needle: "",
        },
        reward: reward(45, 18, Skill::Files),
    },
    QuestDefinition {
        id: "caves-echo-lines",
        zone: ZoneId::GrepCaves,
        title: "Layered Notes",
        intro: "Add multiple lines to a file and search them.",
        goal: "Create lines in journal.txt and grep for cave.",
        hints: &["Use echo to rewrite journal.txt, then `grep cave journal.txt`."],
        check: QuestCheck::All(&[
            QuestCheck::FileContains {
                path: "journal.txt",
                needle: "",
            },
            QuestCheck::CommandUsed("grep cave journal.txt"),
        ]),
        reward: reward(50, 20, Skill::Text),
    },
    QuestDefinition {
        id: "caves-cd-depths",
        zone: ZoneId::GrepCaves,
        title: "Change Levels",
        intro: "Move deeper while keeping bearings.",
        goal: "cd into caves and back out.",
        hints: &["`cd ../caves` then `cd ..`"],
        check: QuestCheck::PathVisited("/home/adventurer/caves"),
        reward: reward(45, 18, Skill::Navigation),
    },
    QuestDefinition {
        id: "caves-ls-grep",
        zone: ZoneId::GrepCaves,
        title: "Pipe Scout",
        intro: "Use a pipe to search listing output.",
        goal: "Use ls | grep echo",
        hints: &["`ls | grep echo`"],
        check: QuestCheck::CommandContains(&["ls | grep echo"]),
        reward: reward(50, 20, Skill::Text),
    },
    QuestDefinition {
        id: "caves-rm-clean",
        zone: ZoneId::GrepCaves,
        title: "Clean Slate",
        intro: "Remove a file you created.",
        goal: "Remove journal.txt.",
        hints: &["Use `rm journal.txt`."],
        check: QuestCheck::All(&[
            QuestCheck::CommandContains(&["rm", "journal.txt"]),
            QuestCheck::NodeAbsent("journal.txt"),
        ]),
        reward: reward(45, 18, Skill::Files),
    },
    QuestDefinition {
        id: "caves-echo-story",
        zone: ZoneId::GrepCaves,
        title: "Tell a Cave Story",
        intro: "Write a story file.",
        goal: "Use echo to create story.txt with the word \"grep\" inside.",
        hints: &["`echo \"grep adventure\" > story.txt`"],
        check: QuestCheck::FileContains {
            path: "story.txt",
            needle: "grep",
        },
        reward: reward(55, 22, Skill::Text),
    },
    QuestDefinition {
        id: "caves-grep-story",
        zone: ZoneId::GrepCaves,
        title: "Search Your Tale",
        intro: "Use grep on your own writing.",
        goal: "Run grep to find grep inside story.txt.",
        hints: &["`grep grep story.txt`"],
        check: QuestCheck::CommandUsed("grep grep story.txt"),
        reward: reward(55, 22, Skill::Text),
    },
];
