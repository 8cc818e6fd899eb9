use crate::state::input_buffer::Edit;
use crate::theme::ColorScheme;

/// Every state mutation in the app goes through an `Action`.
#[derive(Debug, Clone)]
pub enum Action {
    // Lifecycle
    Quit,
    Tick,
    Resize,

    // Navigation
    NavigatorUp,
    NavigatorDown,
    NavigatorTop,
    NavigatorBottom,
    SelectFile(usize),

    // Diff view
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollToTop,
    ScrollToBottom,
    ToggleSelection,

    // Focus
    FocusNavigator,
    FocusDiffView,

    // Navigator filter
    StartSearch,
    ConfirmSearch,
    CancelSearch,
    SearchEdit(Edit),

    // Viewed tracking
    ToggleViewed,
    NextUnviewed,
    ClearViewed,

    // Comment editor
    OpenCommentEditor,
    ConfirmComment,
    CancelComment,
    CommentEdit(Edit),

    // Theme
    CycleTheme,
    SystemSchemeChanged(ColorScheme),

    RefreshDiff,
    ToggleHud,
}
