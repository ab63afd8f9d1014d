//! Starter prompt affordance.
//!
//! Canned first questions offered by the demo UI. Each one goes through
//! the controller's normal submit path exactly like typed input.

/// The starter prompts shown on a fresh conversation.
pub const STARTER_PROMPTS: &[&str] = &[
    "What can you do?",
    "How do I embed the chat widget on my site?",
    "What does the free plan include?",
    "Can I customize the widget's behavior?",
];
