pub mod mnist;

use crate::error::Result;

/// A labelled dataset with a training and a testing split.
pub trait Dataset {
    type Input;
    type Label;
    type Iter: Iterator<Item = Result<(Self::Input, Self::Label)>>;

    fn get_training_iter(&self) -> Result<Self::Iter>;

    fn get_testing_iter(&self) -> Result<Self::Iter>;
}
