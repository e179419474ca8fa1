mod test_membership_oracle;
