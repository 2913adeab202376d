//! Path-based language and file-category classification.
//!
//! Pure lookups over static tables; no filesystem access.

use serde::Serialize;

/// Basenames (matched case-insensitively) that identify a language on their own.
const SPECIAL_BASENAMES: &[(&str, &str)] = &[
    ("dockerfile", "dockerfile"),
    ("makefile", "makefile"),
    ("rakefile", "ruby"),
    ("gemfile", "ruby"),
    ("podfile", "ruby"),
    ("vagrantfile", "ruby"),
    ("jenkinsfile", "groovy"),
    ("cmakelists.txt", "cmake"),
];

/// Extension (lowercase, without the dot) to language tag.
const EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("mts", "typescript"),
    ("cts", "typescript"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("py", "python"),
    ("pyi", "python"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("groovy", "groovy"),
    ("gradle", "groovy"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("hxx", "cpp"),
    ("cs", "csharp"),
    ("fs", "fsharp"),
    ("swift", "swift"),
    ("m", "objective-c"),
    ("mm", "objective-c"),
    ("rb", "ruby"),
    ("php", "php"),
    ("pl", "perl"),
    ("lua", "lua"),
    ("r", "r"),
    ("dart", "dart"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("hs", "haskell"),
    ("clj", "clojure"),
    ("ml", "ocaml"),
    ("zig", "zig"),
    ("nim", "nim"),
    ("jl", "julia"),
    ("asm", "assembly"),
    ("s", "assembly"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("fish", "shell"),
    ("ps1", "powershell"),
    ("sql", "sql"),
    ("html", "html"),
    ("htm", "html"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("less", "less"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("rst", "restructuredtext"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("proto", "protobuf"),
    ("graphql", "graphql"),
    ("gql", "graphql"),
    ("tf", "terraform"),
    ("sol", "solidity"),
];

/// Extensions treated as binary content.
const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "psd",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar", "war",
    // executables and libraries
    "exe", "dll", "so", "dylib", "bin", "o", "a", "class", "wasm", "pyc",
    // audio / video
    "mp3", "wav", "ogg", "flac", "mp4", "mov", "avi", "mkv", "webm",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // office documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

/// Path fragments that mark generated or vendored output.
const GENERATED_FRAGMENTS: &[&str] = &["node_modules", ".min.", "dist/", "build/", "coverage/"];

const LOCKFILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "cargo.lock",
    "gemfile.lock",
    "poetry.lock",
    "composer.lock",
    "go.sum",
    "pipfile.lock",
];

const BUILD_MANIFESTS: &[&str] = &[
    "cargo.toml",
    "package.json",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "pyproject.toml",
    "setup.py",
    "requirements.txt",
    "composer.json",
    "gemfile",
    "podfile",
    "makefile",
    "rakefile",
    "cmakelists.txt",
    "dockerfile",
    "jenkinsfile",
    "vagrantfile",
];

/// Broad category of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Source,
    BuildManifest,
    Generated,
    Binary,
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<String> {
    let name = basename(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        // dotfiles such as `.gitignore` have no extension
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Language tag for a path, or `None` when unknown.
pub fn detect_language(path: &str) -> Option<&'static str> {
    let name = basename(path).to_ascii_lowercase();
    if let Some((_, lang)) = SPECIAL_BASENAMES.iter().find(|(n, _)| *n == name) {
        return Some(*lang);
    }

    let ext = extension(path)?;
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// True when the extension denotes binary content.
pub fn is_binary_path(path: &str) -> bool {
    extension(path)
        .map(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// True for build output, vendored dependencies, minified bundles and lockfiles.
pub fn is_generated_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    GENERATED_FRAGMENTS.iter().any(|f| lower.contains(f))
        || LOCKFILES.contains(&basename(&lower))
}

/// True for files that declare how a project is built.
pub fn is_build_manifest(path: &str) -> bool {
    let name = basename(path).to_ascii_lowercase();
    BUILD_MANIFESTS.contains(&name.as_str())
}

/// Category of a path; generated beats binary beats manifest.
pub fn classify(path: &str) -> FileCategory {
    if is_generated_path(path) {
        FileCategory::Generated
    } else if is_binary_path(path) {
        FileCategory::Binary
    } else if is_build_manifest(path) {
        FileCategory::BuildManifest
    } else {
        FileCategory::Source
    }
}
