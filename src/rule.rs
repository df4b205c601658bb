/// A single configurable constraint: whether it is active and, if so, its parameter.
///
/// Every validator stores its constraints as `Rule`s. A rule starts inactive and is
/// switched on by the owning validator's builder methods. The value is only
/// observable through [`get()`](Self::get) while the flag is set.
///
/// # Example
/// ```
/// use vschema::rule::Rule;
///
/// let mut min: Rule<usize> = Rule::new();
/// assert_eq!(min.get(), None);
/// min.set(3);
/// assert_eq!(min.get(), Some(&3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<T = ()> {
    flag: bool,
    value: Option<T>,
}

impl<T> Rule<T> {
    /// An inactive rule without a value.
    pub fn new() -> Self {
        Self {
            flag: false,
            value: None,
        }
    }

    /// Activate the rule with the given parameter.
    pub fn set(&mut self, value: T) {
        self.flag = true;
        self.value = Some(value);
    }

    /// Whether the rule is active.
    pub fn is_set(&self) -> bool {
        self.flag
    }

    /// The parameter of an active rule.
    pub fn get(&self) -> Option<&T> {
        if self.flag {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Mutable access to the parameter of an active rule.
    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        if self.flag {
            self.value.as_mut()
        } else {
            None
        }
    }
}

impl Rule<()> {
    /// Switch a value-less rule on or off.
    pub fn set_flag(&mut self, flag: bool) {
        self.flag = flag;
        self.value = if flag { Some(()) } else { None };
    }
}

impl<T> Default for Rule<T> {
    fn default() -> Self {
        Self::new()
    }
}
