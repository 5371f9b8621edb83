use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
    Hint,
}

/// Interactive surface the menus talk to.
pub trait Ui {
    /// Index of the chosen item, or `None` when the user backs out.
    fn choose(&self, header: &str, items: &[String]) -> Result<Option<usize>>;

    /// Entered text, or `None` when the user backs out.
    fn input(&self, prompt: &str, initial: &str) -> Result<Option<String>>;

    fn notice(&self, tone: Tone, text: &str);

    fn pause(&self, prompt: &str);
}

pub struct TerminalUi {
    theme: ColorfulTheme,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Ui for TerminalUi {
    fn choose(&self, header: &str, items: &[String]) -> Result<Option<usize>> {
        println!();
        let selection = Select::with_theme(&self.theme)
            .with_prompt(header)
            .items(items)
            .default(0)
            .interact_opt()?;
        Ok(selection)
    }

    fn input(&self, prompt: &str, initial: &str) -> Result<Option<String>> {
        let text: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(text))
    }

    fn notice(&self, tone: Tone, text: &str) {
        match tone {
            Tone::Info => println!("{}", text),
            Tone::Success => println!("✔ {}", text),
            Tone::Error => println!("❌ {}", text),
            Tone::Hint => println!("\n💡 {}", text),
        }
    }

    fn pause(&self, prompt: &str) {
        let _ = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
    }
}

/// Menu driver for tests: picks items by label prefix and replays typed
/// answers in order.
#[cfg(test)]
pub mod scripted {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub struct ScriptedUi {
        choices: RefCell<VecDeque<Option<&'static str>>>,
        inputs: RefCell<VecDeque<Option<String>>>,
        pub headers: RefCell<Vec<String>>,
        pub offered: RefCell<Vec<Vec<String>>>,
        pub notices: RefCell<Vec<(Tone, String)>>,
    }

    impl ScriptedUi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn choose_item(self, label: &'static str) -> Self {
            self.choices.borrow_mut().push_back(Some(label));
            self
        }

        pub fn back(self) -> Self {
            self.choices.borrow_mut().push_back(None);
            self
        }

        pub fn type_text(self, text: &str) -> Self {
            self.inputs.borrow_mut().push_back(Some(text.to_string()));
            self
        }

        pub fn back_from_input(self) -> Self {
            self.inputs.borrow_mut().push_back(None);
            self
        }

        pub fn has_notice(&self, tone: Tone, fragment: &str) -> bool {
            self.notices
                .borrow()
                .iter()
                .any(|(t, text)| *t == tone && text.contains(fragment))
        }
    }

    impl Ui for ScriptedUi {
        fn choose(&self, header: &str, items: &[String]) -> Result<Option<usize>> {
            self.headers.borrow_mut().push(header.to_string());
            self.offered.borrow_mut().push(items.to_vec());
            let next = self
                .choices
                .borrow_mut()
                .pop_front()
                .expect("menu shown without a scripted choice");
            Ok(next.map(|label| {
                items
                    .iter()
                    .position(|item| item.starts_with(label))
                    .unwrap_or_else(|| panic!("no item '{}' in {:?}", label, items))
            }))
        }

        fn input(&self, _prompt: &str, initial: &str) -> Result<Option<String>> {
            Ok(self
                .inputs
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Some(initial.to_string())))
        }

        fn notice(&self, tone: Tone, text: &str) {
            self.notices.borrow_mut().push((tone, text.to_string()));
        }

        fn pause(&self, _prompt: &str) {}
    }
}
