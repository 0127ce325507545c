// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules turn ignorefile text into executable rules and
// turn finished results into something a person or a program can read.

// The `pub mod importer;` declaration exposes the `importer` module.
//
// `importer` module:
// This module reads an ignorefile into ordered rule lines (skipping comments
// and blank lines), compiles them into `Pattern`s, and defines the
// `PatternImporter` trait the engine uses to load each scope's rules. It also
// owns the default ignorefile name.
pub mod importer;

// The `pub mod patterns;` declaration exposes the `patterns` module.
//
// `patterns` module:
// This is a fundamental module that defines the `Pattern` rule type and the
// glob dialect (`*`, `**`, `?`, character classes, escapes). It also provides
// the `PathPredicate` trait that decouples the precedence algorithm from the
// way a rule decides membership.
pub mod patterns;

// The `pub mod reporter;` declaration exposes the `reporter` module.
//
// `reporter` module:
// This module renders a `MatchesResult` for people (`ConsoleReporter`) and
// exports it as JSON, YAML or TOML for other programs.
pub mod reporter;

// The `pub mod validator;` declaration exposes the `validator` module.
//
// `validator` module:
// This module checks ignorefile rules before use: malformed globs, rules
// that can never match, and duplicates.
pub mod validator;
