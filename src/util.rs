// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use itertools::Itertools;

/// Removes the duplicated elements of `items` and sorts the remaining ones by
/// their natural order.
///
/// # Examples
///
/// ```
/// use nfa_dfa::util::remove_duplicates;
///
/// assert_eq!(remove_duplicates(vec![3, 1, 3, 2, 1]), vec![1, 2, 3]);
/// ```
pub fn remove_duplicates<T, I>(items: I) -> Vec<T>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    items.into_iter().sorted().dedup().collect()
}
