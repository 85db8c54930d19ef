use std_util::str;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Name {
    pub parts: Vec<String>,
}

impl Name {
    pub fn new(src: &str) -> Self {
        let snake = str::snake_case(src);
        let parts = snake.split('_').map(String::from).collect();
        Self { parts }
    }

    pub fn upper_camel_case(&self) -> String {
        str::upper_camel_case(&self.snake_case())
    }

    pub fn snake_case(&self) -> String {
        self.parts.join("_")
    }

    /// Collection name derived from the model name: the snake-cased name
    /// with its last word pluralized (`UserProfile` -> `user_profiles`).
    pub fn plural_snake_case(&self) -> String {
        let mut parts = self.parts.clone();
        if let Some(last) = parts.last_mut() {
            *last = str::pluralize(last);
        }
        parts.join("_")
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.upper_camel_case())
    }
}
