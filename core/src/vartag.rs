//! The bracket family that defines block/variable/escape punctuation
//! (spec §4.4, component D).

/// One of the three punctuation families a document may be parsed with.
/// Invariant: `escape_char` is never equal to `left_char`, `right_char`, or
/// `procedure_char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableTag {
    /// `{ } % $ \`
    Brace,
    /// `< > % $ \`
    Angle,
    /// `[ ] % $ \`
    Square,
}

impl Default for VariableTag {
    fn default() -> Self {
        VariableTag::Brace
    }
}

impl VariableTag {
    pub fn left_char(self) -> char {
        match self {
            VariableTag::Brace => '{',
            VariableTag::Angle => '<',
            VariableTag::Square => '[',
        }
    }

    pub fn right_char(self) -> char {
        match self {
            VariableTag::Brace => '}',
            VariableTag::Angle => '>',
            VariableTag::Square => ']',
        }
    }

    pub fn procedure_char(self) -> char {
        '%'
    }

    pub fn variable_char(self) -> char {
        '$'
    }

    pub fn escape_char(self) -> char {
        '\\'
    }

    /// `LL...RR` — e.g. `{{ ... }}` for [VariableTag::Brace].
    pub fn function(self, body: &str) -> String {
        let l = self.left_char();
        let r = self.right_char();
        format!("{l}{l} {body} {r}{r}")
    }

    /// `LP...PR` — e.g. `{% ... %}` for [VariableTag::Brace].
    pub fn procedure(self, body: &str) -> String {
        let l = self.left_char();
        let p = self.procedure_char();
        let r = self.right_char();
        format!("{l}{p} {body} {p}{r}")
    }

    /// `VL name R` — e.g. `${name}` for [VariableTag::Brace].
    pub fn variable(self, name: &str) -> String {
        format!("{}{}{}", self.variable_char(), self.left_char(), name)
            + &self.right_char().to_string()
    }

    /// Any character that is not one of the four structural punctuation
    /// chars may be escaped with [VariableTag::escape_char] (spec §4.1).
    pub fn valid_for_escape(self, c: char) -> bool {
        c != self.left_char() && c != self.right_char() && c != self.procedure_char()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_char_never_collides_with_structural_chars() {
        for tag in [VariableTag::Brace, VariableTag::Angle, VariableTag::Square] {
            let esc = tag.escape_char();
            assert_ne!(esc, tag.left_char());
            assert_ne!(esc, tag.right_char());
            assert_ne!(esc, tag.procedure_char());
        }
    }

    #[test]
    fn builders_match_expected_punctuation() {
        assert_eq!(VariableTag::Brace.function("x"), "{{ x }}");
        assert_eq!(VariableTag::Brace.procedure("x"), "{% x %}");
        assert_eq!(VariableTag::Brace.variable("a"), "${a}");
        assert_eq!(VariableTag::Angle.variable("a"), "$<a>");
    }
}
