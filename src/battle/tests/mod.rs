pub mod common;


#[cfg(test)]
mod test_switching;


#[cfg(test)]
mod test_status_moves;



#[cfg(test)]
mod test_session;
