// Markdown note written by `churn git-probe`.

use crate::stamp::Stamp;

pub const DEFAULT_FILE_NAME: &str = "test_git_functionality.md";

pub fn render(stamp: &Stamp) -> String {
    let iso = stamp.iso();
    format!(
        "
# Git Test File

This file was created at {iso} to test Git initialization.

## Expected Behavior:
1. Git should be initialized in the project directory
2. This file should be detected as a change
3. Auto-commit should create a branch after 3 minutes
4. Branch should be visible in the project

## Fixes Applied:
- Added 'type: BashCommand' field to BashCommand calls in gitService.ts
- Updated rootStore to preserve type field when processing BashCommand
- Fixed both project and non-project context handling

## Test Status:
- File created: ✅
- Git init: Pending...
- Branch creation: Pending...
"
    )
}
