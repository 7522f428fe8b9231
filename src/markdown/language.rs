//! Code block language vocabulary.

/// Language used when a fence tag is missing or unknown
pub const FALLBACK_LANGUAGE: &str = "plain text";

/// Languages the remote store accepts for code blocks.
const LANGUAGES: &[&str] = &[
    "abap", "abc", "agda", "arduino", "ascii art", "assembly", "bash", "basic", "bnf", "c",
    "c#", "c++", "clojure", "coffeescript", "coq", "css", "dart", "dhall", "diff", "docker",
    "ebnf", "elixir", "elm", "erlang", "f#", "flow", "fortran", "gherkin", "glsl", "go",
    "graphql", "groovy", "haskell", "hcl", "html", "idris", "java", "javascript", "json",
    "julia", "kotlin", "latex", "less", "lisp", "livescript", "llvm ir", "lua", "makefile",
    "markdown", "markup", "matlab", "mathematica", "mermaid", "nix", "notion formula",
    "objective-c", "ocaml", "pascal", "perl", "php", "plain text", "powershell", "prolog",
    "protobuf", "purescript", "python", "r", "racket", "reason", "ruby", "rust", "sass",
    "scala", "scheme", "scss", "shell", "smalltalk", "solidity", "sql", "swift", "toml",
    "typescript", "vb.net", "verilog", "vhdl", "visual basic", "webassembly", "xml", "yaml",
    "java/c/c++/c#",
];

/// Common fence tags and the vocabulary entry they stand for.
const ALIASES: &[(&str, &str)] = &[
    ("tsx", "typescript"),
    ("jsx", "javascript"),
    ("sh", "shell"),
    ("zsh", "shell"),
    ("yml", "yaml"),
    ("dockerfile", "docker"),
    ("kt", "kotlin"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("ts", "typescript"),
    ("js", "javascript"),
    ("md", "markdown"),
    ("objc", "objective-c"),
    ("cs", "c#"),
    ("cpp", "c++"),
    ("fs", "f#"),
    ("vb", "visual basic"),
    ("hs", "haskell"),
    ("pl", "perl"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("ml", "ocaml"),
    ("ps1", "powershell"),
    ("proto", "protobuf"),
    ("sol", "solidity"),
    ("wasm", "webassembly"),
];

/// Normalize a fence tag against the vocabulary.
pub fn normalize_language(tag: &str) -> &'static str {
    let tag = tag.trim().to_lowercase();
    if let Some(lang) = LANGUAGES.iter().copied().find(|l| *l == tag) {
        return lang;
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == tag)
        .map(|(_, lang)| *lang)
        .unwrap_or(FALLBACK_LANGUAGE)
}
