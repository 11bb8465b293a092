/// A plaintext ballot: the id of the chosen candidate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ballot {
    pub candidate_id: i32,
}

impl Ballot {
    pub fn new(candidate_id: i32) -> Self {
        Ballot { candidate_id }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub id: i32,
    pub name: String,
}

impl Candidate {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Candidate {
            id,
            name: name.into(),
        }
    }
}
