use crate::constraints::Joint;

/// An arena of short-lived joints.
///
/// Contact joints are pushed here during collision handling, consumed
/// by the next step, and discarded in one `clear` call, so per-contact
/// bookkeeping never touches the world's persistent joint storage.
#[derive(Default)]
pub struct JointGroup {
    joints: Vec<Joint>,
}

impl JointGroup {
    /// Creates an empty group
    pub fn new() -> Self {
        Self { joints: Vec::new() }
    }

    /// Adds a joint to the group
    pub fn add(&mut self, joint: Joint) {
        self.joints.push(joint);
    }

    /// Removes every joint in the group
    pub fn clear(&mut self) {
        self.joints.clear();
    }

    /// Returns the number of joints in the group
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Returns whether the group is empty
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Returns an iterator over the joints in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Joint> {
        self.joints.iter()
    }
}
